//! Loading proxy lists from `{protocol}.txt` files

use crate::proxy::models::{Protocol, ProxyLists};
use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Read a list file, decoding as UTF-8 and falling back to Latin-1
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = ?path, "File is not valid UTF-8, decoding as Latin-1");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(String::from)
        .collect())
}

/// Load `{dir}/{protocol}.txt` for each requested protocol
pub fn load_proxy_lists<P: AsRef<Path>>(dir: P, protocols: &[Protocol]) -> Result<ProxyLists> {
    let dir = dir.as_ref();
    let mut lists = ProxyLists::new();

    for &protocol in protocols {
        let path = dir.join(format!("{}.txt", protocol));
        let lines = read_lines(&path)?;
        tracing::info!(%protocol, count = lines.len(), path = ?path, "Loaded proxy list");
        lists.entry(protocol).or_default().extend(lines);
    }

    Ok(lists)
}
