use crate::error::{Result, SheetError};
use std::path::Path;

pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SheetError::InvalidInput(format!(
            "Input not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(SheetError::InvalidInput(format!(
            "Input is not a file: {}",
            path.display()
        )));
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| SheetError::io(path, e))?;
    }
    Ok(())
}
