use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use super::config_service;

pub fn path(config_path: Option<&Path>) -> Result<ExitCode> {
    let service = config_service(config_path)?;
    println!("{}", service.path().display());
    Ok(ExitCode::SUCCESS)
}
