use arbor::{AppRunner, Argument, Command, Invocation, ValueType};

fn operation(name: &str, about: &str) -> Command {
    let name_owned = name.to_string();

    Command::new(name)
        .about(about)
        .add(Argument::operand("x", ValueType::int()).help("The left term."))
        .add(Argument::operand("y", ValueType::int()).help("The right term."))
        .target(move |invocation: &Invocation| {
            let x: i64 = invocation.value("x")?;
            let y: i64 = invocation.value("y")?;
            let precise: bool = invocation.value("precise")?;
            let result = match name_owned.as_str() {
                "add" => x + y,
                "subtract" => x - y,
                "multiply" => x * y,
                _ => {
                    if y == 0 {
                        return Err("cannot divide by zero".into());
                    }

                    if precise {
                        invocation.console().print(format!("{}", x as f64 / y as f64));
                        return Ok(());
                    }

                    x / y
                }
            };
            invocation.console().print(format!("{result}"));
            Ok(())
        })
}

fn main() {
    let root = Command::new("calculator")
        .about("Integer arithmetic.")
        .add(
            Argument::flag("precise")
                .short('p')
                .help("Divide without truncating.")
                .assign_to_executable_subcommands(),
        )
        .subcommand(operation("add", "Add two numbers."))
        .subcommand(operation("subtract", "Subtract y from x."))
        .subcommand(operation("multiply", "Multiply two numbers."))
        .subcommand(operation("divide", "Divide x by y."));

    let app = AppRunner::new(root).build();

    match app.run() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(70);
        }
    }
}
