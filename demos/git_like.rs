use std::time::Instant;

use arbor::{
    AppRunner, AppSettings, Argument, ArgumentGroup, Case, Command, Continuation, Invocation,
    ValueType,
};

fn commit() -> Command {
    Command::new("commit")
        .about("Record changes to the repository.")
        .add(
            Argument::option("message", ValueType::text())
                .short('m')
                .help("The commit message."),
        )
        .add(Argument::flag("amend").help("Replace the tip of the current branch."))
        .add(
            Argument::operand("paths", ValueType::text().collection())
                .help("Limit the commit to these paths."),
        )
        .target(|invocation: &Invocation| {
            let message: String = invocation.value("message")?;
            let amend: bool = invocation.value("amend")?;
            let paths: Vec<String> = invocation.value("paths")?;
            let dry_run: bool = invocation.value("dry-run")?;
            let verb = if amend { "Amending" } else { "Committing" };
            let prefix = if dry_run { "(dry run) " } else { "" };
            invocation
                .console()
                .print(format!("{prefix}{verb} {paths:?}: {message}"));
            Ok(())
        })
}

fn log() -> Command {
    Command::new("log")
        .about("Show commit logs.")
        .add(
            ArgumentGroup::new("range")
                .add(Argument::operand("since", ValueType::text().nullable()).order(1))
                .add(Argument::operand("until", ValueType::text().nullable()).order(2)),
        )
        .add(
            Argument::option(
                "format",
                ValueType::enumeration("Format", ["short", "full", "oneline"]),
            )
            .default_value("short")
            .group_tag("formatting"),
        )
        .capture_separated_arguments()
        .target(|invocation: &Invocation| {
            let since: Option<String> = invocation.value("since")?;
            let until: Option<String> = invocation.value("until")?;
            let format: String = invocation.value("format")?;
            invocation.console().print(format!(
                "log {}..{} as {format}, limited to {:?}",
                since.unwrap_or_default(),
                until.unwrap_or_else(|| "HEAD".to_string()),
                invocation.separated_arguments()
            ));
            Ok(())
        })
}

fn main() {
    let root = Command::new("GitLike")
        .about("A version control front end.")
        .add(
            Argument::flag("dryRun")
                .short('n')
                .help("Only show what would happen.")
                .assign_to_executable_subcommands(),
        )
        .add(Argument::flag("timed").help("Report how long the command took."))
        .interceptor(|invocation: &Invocation, next: Continuation| {
            let timed: bool = invocation.value("timed")?;
            let start = Instant::now();
            let outcome = next.proceed()?;

            if timed {
                invocation
                    .console()
                    .print(format!("took {:?}", start.elapsed()));
            }

            Ok(outcome)
        })
        .subcommand(commit())
        .subcommand(log())
        .with_case(Case::Kebab);

    let settings = AppSettings::default()
        .allow_slash_prefix(true)
        .response_files(true);
    let app = AppRunner::new(root).settings(settings).build();

    match app.run() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(70);
        }
    }
}
