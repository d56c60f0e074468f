use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use tempfile::TempDir;

pub fn build_temp_file(temp_dir: &TempDir, base: &str, extension: &str) -> (PathBuf, String) {
    let file_name = format!("{}.{}", base, extension);
    let mut path_buf = temp_dir.path().to_path_buf();
    path_buf.push(file_name.clone());

    (path_buf, file_name)
}

pub fn build_temp_json_file(temp_dir: &TempDir, base: &str) -> (PathBuf, String) {
    build_temp_file(temp_dir, base, "json")
}

pub fn build_temp_csv_file(temp_dir: &TempDir, base: &str) -> (PathBuf, String) {
    build_temp_file(temp_dir, base, "csv")
}

pub fn write_json_file<T: serde::Serialize>(path: &PathBuf, value: &T) -> std::io::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value).map_err(std::io::Error::other)?;
    Ok(())
}

/// Dump a file to stdout so failing tests show the content that was used.
pub fn dump_file(name: &str, path: PathBuf) -> std::io::Result<()> {
    let mut file = File::open(path.clone())?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;

    println!("{}: {}", name, path.display());
    println!("{}", content);

    Ok(())
}
