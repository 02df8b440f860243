/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Durable symbol catalog: a sorted newline manifest, mutated only by append.
//!
//! Symbols that disappear from the live set stay in the catalog; they encode
//! history. The manifest is rewritten (atomically) only when discovery added
//! something.

use bfa_core::{Result, Symbol};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The ordered set of contract identifiers ever known to the pipeline.
#[derive(Debug)]
pub struct SymbolCatalog {
  path: PathBuf,
  symbols: BTreeSet<Symbol>,
}

impl SymbolCatalog {
  /// Load the manifest. A missing file is an empty catalog (first run);
  /// a malformed line is a pre-flight configuration error.
  pub fn load(path: &Path) -> Result<Self> {
    let symbols = match std::fs::read_to_string(path) {
      Ok(raw) => {
        let mut symbols = BTreeSet::new();
        for line in raw.lines() {
          let line = line.trim();
          if line.is_empty() {
            continue;
          }
          symbols.insert(Symbol::parse(line)?);
        }
        symbols
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
      Err(e) => return Err(e.into()),
    };

    debug!(path = %path.display(), symbols = symbols.len(), "catalog loaded");
    Ok(SymbolCatalog { path: path.to_path_buf(), symbols })
  }

  pub fn symbols(&self) -> &BTreeSet<Symbol> {
    &self.symbols
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  /// Additive merge with the live set. Returns the newly discovered symbols
  /// in order; symbols absent from the live set are retained.
  pub fn merge(&mut self, live: &BTreeSet<Symbol>) -> Vec<Symbol> {
    let added: Vec<Symbol> =
      live.iter().filter(|symbol| !self.symbols.contains(*symbol)).cloned().collect();
    for symbol in &added {
      self.symbols.insert(symbol.clone());
    }
    if !added.is_empty() {
      info!(added = added.len(), "catalog discovered new symbols");
    }
    added
  }

  /// Rewrite the manifest atomically (write-temp-then-rename). Called only
  /// when a merge added symbols.
  pub fn persist(&self) -> Result<()> {
    let file_name = self
      .path
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .ok_or_else(|| bfa_core::Error::Config(format!(
        "invalid catalog path: {}",
        self.path.display()
      )))?;
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }
    let tmp_path = self.path.with_file_name(format!("{file_name}.tmp"));

    {
      let mut file = std::fs::File::create(&tmp_path)?;
      for symbol in &self.symbols {
        writeln!(file, "{symbol}")?;
      }
      file.sync_all()?;
    }

    std::fs::rename(&tmp_path, &self.path)?;
    debug!(path = %self.path.display(), symbols = self.symbols.len(), "catalog persisted");
    Ok(())
  }
}
