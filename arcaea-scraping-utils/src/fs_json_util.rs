use std::{
    any::type_name,
    fmt::Debug,
    io::{BufReader, BufWriter, Read, Write},
    path::PathBuf,
};

use anyhow::Context;
use fs_err::File;
use serde::{de::DeserializeOwned, Serialize};

pub fn read_json<P: Into<PathBuf> + Debug, T: DeserializeOwned>(path: P) -> anyhow::Result<T> {
    parse_file(path.into(), |file| {
        Ok(serde_json::from_reader(BufReader::new(file))?)
    })
}

pub fn read_toml<P: Into<PathBuf> + Debug, T: DeserializeOwned>(path: P) -> anyhow::Result<T> {
    parse_file(path.into(), |mut file| {
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        Ok(toml::from_str(&text)?)
    })
}

fn parse_file<T>(
    path: PathBuf,
    parse: impl FnOnce(File) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    File::open(&path)
        .map_err(anyhow::Error::new)
        .and_then(parse)
        .with_context(|| format!("While reading {path:?} as {}", type_name::<T>()))
}

/// Writes indented JSON terminated by a newline.
pub fn write_json_pretty<P: Into<PathBuf>, T: Serialize>(
    path: P,
    value: &T,
) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
