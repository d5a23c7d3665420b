use std::env;

pub fn run() {
    println!("Name           : {}", clap::crate_name!());
    println!("Version        : {}", clap::crate_version!());
    println!("Description    : {}", clap::crate_description!());
    println!("OS             : {}", env::consts::OS);
    println!("Architecture   : {}", env::consts::ARCH);
}
