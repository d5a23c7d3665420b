use clap::{arg, command, crate_name, ArgMatches, Command};

mod cli;

#[tokio::main]
async fn main() {
    let cli = command!(crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand(Command::new(cli::VERSION_SUBCOMMAND).about(cli::VERSION_DESCRIPTION))
        .subcommand(Command::new(cli::BUGREPORT_SUBCOMMAND).about(cli::BUGREPORT_DESCRIPTION))
        .subcommand(Command::new(cli::SERVER_SUBCOMMAND).about(cli::SERVER_DESCRIPTION))
        .subcommand(
            Command::new(cli::UPLOAD_SUBCOMMAND)
                .about(cli::UPLOAD_DESCRIPTION)
                .arg(arg!(-u --uri <URI>).required(true).help("Fstore URI"))
                .arg(
                    arg!(-f --file <FILE>)
                        .required(true)
                        .help("Path to file to upload"),
                ),
        )
        .subcommand(
            Command::new(cli::DOWNLOAD_SUBCOMMAND)
                .about(cli::DOWNLOAD_DESCRIPTION)
                .arg(arg!(-u --uri <URI>).required(true).help("Fstore URI"))
                .arg(
                    arg!(-n --name <NAME>)
                        .required(true)
                        .help("Name of the stored file"),
                )
                .arg(
                    arg!(-o --output <PATH>)
                        .required(false)
                        .help("Where to save the file. The stored name in the current directory by default"),
                ),
        )
        .arg_required_else_help(true)
        .disable_version_flag(true)
        .get_matches();

    match cli.subcommand() {
        Some((cli::VERSION_SUBCOMMAND, _)) => cli::version::run(),
        Some((cli::BUGREPORT_SUBCOMMAND, _)) => cli::bugreport::run(),
        Some((cli::SERVER_SUBCOMMAND, _)) => cli::server::run().await,
        Some((cli::UPLOAD_SUBCOMMAND, matches)) => {
            cli::client::upload(required(matches, "uri"), required(matches, "file"))
                .await
                .unwrap_or_else(|e| cli::client::fail("upload", &e));
        }
        Some((cli::DOWNLOAD_SUBCOMMAND, matches)) => {
            cli::client::download(
                required(matches, "uri"),
                required(matches, "name"),
                matches.get_one::<String>("output"),
            )
            .await
            .unwrap_or_else(|e| cli::client::fail("download", &e));
        }
        _ => {}
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    // clap enforces presence of required arguments before we get here
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}
