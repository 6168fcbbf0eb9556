use arbor::{AppRunner, AppSettings, Argument, Command, Invocation, Value, ValueType};

fn main() {
    let root = Command::new("summer")
        .add(
            Argument::operand("item", ValueType::int().collection())
                .piped()
                .help("The items to sum; piped lines follow any given here."),
        )
        .target(|invocation: &Invocation| {
            let mut sum: i64 = 0;

            // Lines are read one at a time, stopping early on Ctrl-C.
            for item in invocation.stream("item")? {
                if let Value::Int(value) = item? {
                    sum += value;
                }
            }

            if invocation.cancellation().is_cancelled() {
                invocation.console().print(format!("Partial sum: {sum}"));
                return Ok(130);
            }

            invocation.console().print(format!("Sum: {sum}"));
            Ok(0)
        });

    let app = AppRunner::new(root)
        .settings(AppSettings::default().cancel_on_ctrl_c(true))
        .build();

    match app.run() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(70);
        }
    }
}
