use client::ClientError;
use std::path::{Path, PathBuf};

pub async fn upload(uri: &str, file: &str) -> Result<(), ClientError> {
    let name = client::upload_file(uri, Path::new(file)).await?;
    println!("file {file} uploaded as {name}");
    Ok(())
}

pub async fn download(uri: &str, name: &str, output: Option<&String>) -> Result<(), ClientError> {
    let target = output.map_or_else(|| PathBuf::from(name), PathBuf::from);
    let info = client::download_file(uri, name, &target).await?;
    client::print_file_info(&info);
    println!("saved to {}", target.display());
    Ok(())
}

/// Reports a failed client command on stderr and exits with a non-zero code.
pub fn fail(action: &str, e: &ClientError) -> ! {
    eprintln!("{action} error: {e}");
    std::process::exit(1);
}
