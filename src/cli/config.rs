use std::path::Path;

use anyhow::{Context, Result};

use crate::settings::{load_settings, save_settings, Settings};

pub fn show(path: &Path) -> Result<()> {
    let settings = load_settings(path);
    println!("Settings:     {}", path.display());
    print!("{}", format_settings(&settings));
    Ok(())
}

pub fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings(path);
    settings.set(key, value)?;
    save_settings(&settings, path).with_context(|| format!("saving {}", path.display()))?;
    println!("Set {key} = {value}");
    Ok(())
}

pub fn path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    Ok(())
}

pub fn format_settings(s: &Settings) -> String {
    format!(
        "tolerance:    {}\nday_first:    {}\nline_bucket:  {}\nmin_rows:     {}\nsample_rows:  {}\n",
        s.tolerance, s.day_first, s.line_bucket, s.min_rows, s.sample_rows
    )
}
