//! Writes lookup tables as a C/C++ header.
//!
//! The header starts with a preamble defining the table resolution and an
//! index macro converting a phase into a table index, followed by one array
//! declaration per table:
//!
//! ```text
//! #pragma once
//! #include "esp_attr.h"
//!
//! #define LUTGEN_RESOLUTION 1024
//! #define LUTGEN_INDEX(x) (...)
//!
//! IRAM_ATTR float lutgen_sin[1024] = {
//!     0.0000000000f,0.0061358846f,...
//! };
//! ```
//!
//! The whole header is rendered in memory before anything touches the disk,
//! so a table with the wrong length never results in a partial file.

use super::{FormatPolicy, HeaderLayout, IndexWrap, LutConfig, LutError, Wavetable, Float};

use log::{debug, info};

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct HeaderWriter {
    format: FormatPolicy,
    layout: HeaderLayout,
}

impl HeaderWriter {
    pub fn new(format: FormatPolicy, layout: HeaderLayout) -> HeaderWriter {
        HeaderWriter { format, layout }
    }

    pub fn from_config(config: &LutConfig) -> HeaderWriter {
        HeaderWriter::new(config.format.clone(), config.layout.clone())
    }

    /// Check that every table holds exactly one sample per table index.
    ///
    /// ```
    /// use lutgen::{HeaderWriter, Wavetable, Waveform};
    ///
    /// let writer = HeaderWriter::new(Default::default(), Default::default());
    /// let wt = Wavetable::from_tables(4, vec![(Waveform::Saw, vec![-1.0, -0.5, 0.0])]);
    /// assert!(writer.check_tables(&wt).is_err());
    /// ```
    pub fn check_tables(&self, wt: &Wavetable) -> Result<(), LutError> {
        if wt.resolution == 0 {
            return Err(LutError::InvalidResolution(wt.resolution));
        }
        if wt.tables.is_empty() {
            return Err(LutError::EmptyWaveformSet);
        }
        if self.format.literals_per_line == 0 {
            return Err(LutError::InvalidLineWidth(self.format.literals_per_line));
        }
        for (i, (wave, table)) in wt.iter().enumerate() {
            if table.len() != wt.resolution {
                return Err(LutError::TableLength {
                    waveform: *wave,
                    expected: wt.resolution,
                    actual: table.len(),
                });
            }
            if wt.tables[..i].iter().any(|(w, _)| w == wave) {
                return Err(LutError::DuplicateWaveform(*wave));
            }
        }
        Ok(())
    }

    /// Format a single sample value.
    ///
    /// ```
    /// use lutgen::HeaderWriter;
    ///
    /// let writer = HeaderWriter::new(Default::default(), Default::default());
    /// assert_eq!(writer.format_literal(-0.5), "-0.5000000000f");
    /// ```
    pub fn format_literal(&self, value: Float) -> String {
        format!("{:.*}{}", self.format.precision, value, self.format.suffix)
    }

    /// Body of the index macro, taking the phase as argument `x`.
    pub fn index_expression(&self) -> String {
        let n = &self.layout.resolution_macro;
        let scaled = format!("((x) * {})", n);
        let truncated = format!("(int32_t){}", scaled);
        match self.layout.index_wrap {
            IndexWrap::Truncate => format!("({} % {})", truncated, n),
            IndexWrap::Floor => {
                // Truncation rounds negative values up, step back by one for
                // those. Then move the C remainder into [0, N).
                let floored = format!("({} - ({} < {}))", truncated, scaled, truncated);
                format!("((({} % {}) + {}) % {})", floored, n, n, n)
            }
        }
    }

    /// Render the preamble with include lines and macros.
    pub fn render_preamble(&self, resolution: usize) -> String {
        let layout = &self.layout;
        let mut text = String::new();
        text.push_str(&format!("{}\n", layout.include_guard));
        text.push_str(&format!("#include \"{}\"\n", layout.attribute_header));
        text.push('\n');
        text.push_str(&format!("#define {} {}\n", layout.resolution_macro, resolution));
        text.push_str(&format!("#define {}(x) {}\n", layout.index_macro, self.index_expression()));
        text.push('\n');
        text
    }

    /// Render the declaration of a single table.
    pub fn render_table(&self, name: &str, table: &[Float]) -> String {
        let layout = &self.layout;
        let mut text = String::new();
        let mut declaration = Vec::new();
        if !layout.memory_attribute.is_empty() {
            declaration.push(layout.memory_attribute.as_str());
        }
        declaration.push(layout.element_type.as_str());
        text.push_str(&format!("{} {}{}[{}] = {{\n",
            declaration.join(" "), layout.symbol_prefix, name, table.len()));

        for line in table.chunks(self.format.literals_per_line) {
            let literals: Vec<String> = line.iter().map(|v| self.format_literal(*v)).collect();
            text.push_str(&self.format.indent);
            text.push_str(&literals.join(self.format.separator.as_str()));
            text.push_str(",\n");
        }

        text.push_str("};\n");
        for _ in 0..layout.blank_lines_after_table {
            text.push('\n');
        }
        text
    }

    /// Render the complete header.
    ///
    /// Fails without producing any output if a table has the wrong length.
    ///
    /// ```
    /// use lutgen::{HeaderWriter, TableBuilder, Waveform};
    ///
    /// let wt = TableBuilder::new(1024).unwrap().build(&[Waveform::Sin]).unwrap();
    /// let writer = HeaderWriter::new(Default::default(), Default::default());
    /// let header = writer.render(&wt).unwrap();
    /// assert!(header.starts_with("#pragma once\n"));
    /// assert!(header.contains("IRAM_ATTR float lutgen_sin[1024] = {\n"));
    /// ```
    pub fn render(&self, wt: &Wavetable) -> Result<String, LutError> {
        self.check_tables(wt)?;
        let mut text = self.render_preamble(wt.resolution);
        for (wave, table) in wt.iter() {
            text.push_str(&self.render_table(wave.name(), table));
            info!("Added {}", wave);
        }
        Ok(text)
    }

    /// Render the header and write it to the given path.
    ///
    /// The content goes to a temporary file next to the target first, which
    /// is then renamed to the final name. The target is either fully
    /// replaced or left untouched.
    pub fn write_file(&self, wt: &Wavetable, path: &Path) -> Result<(), LutError> {
        let text = self.render(wt)?;
        let tmp_path = HeaderWriter::tmp_path(path);
        debug!("Writing {} bytes to [{}]", text.len(), tmp_path.display());
        if let Err(e) = HeaderWriter::write_content(&tmp_path, text.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(LutError::io(path, e));
        }
        info!("Generated file [{}]", path.display());
        Ok(())
    }

    fn write_content(path: &Path, content: &[u8]) -> Result<(), LutError> {
        let mut file = File::create(path).map_err(|e| LutError::io(path, e))?;
        file.write_all(content).map_err(|e| LutError::io(path, e))?;
        file.sync_all().map_err(|e| LutError::io(path, e))
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.tmp", name))
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use super::{TableBuilder, Waveform};
#[cfg(test)]
use pretty_assertions::assert_eq;

#[cfg(test)]
fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lutgen-writer-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
fn default_writer() -> HeaderWriter {
    HeaderWriter::new(FormatPolicy::default(), HeaderLayout::default())
}

#[test]
fn small_table_has_exact_layout() {
    let mut format = FormatPolicy::default();
    format.literals_per_line = 3;
    let writer = HeaderWriter::new(format, HeaderLayout::default());
    let wt = TableBuilder::new(4).unwrap().build(&[Waveform::Saw]).unwrap();
    let expected = concat!(
        "#pragma once\n",
        "#include \"esp_attr.h\"\n",
        "\n",
        "#define LUTGEN_RESOLUTION 4\n",
        "#define LUTGEN_INDEX(x) (((((int32_t)((x) * LUTGEN_RESOLUTION) - (((x) * LUTGEN_RESOLUTION) < (int32_t)((x) * LUTGEN_RESOLUTION))) % LUTGEN_RESOLUTION) + LUTGEN_RESOLUTION) % LUTGEN_RESOLUTION)\n",
        "\n",
        "IRAM_ATTR float lutgen_saw[4] = {\n",
        "    -1.0000000000f,-0.5000000000f,0.0000000000f,\n",
        "    0.5000000000f,\n",
        "};\n",
        "\n",
        "\n",
    );
    assert_eq!(writer.render(&wt).unwrap(), expected);
}

#[test]
fn truncating_macro_matches_c_cast() {
    let mut layout = HeaderLayout::default();
    layout.index_wrap = IndexWrap::Truncate;
    let writer = HeaderWriter::new(FormatPolicy::default(), layout);
    assert_eq!(writer.render_preamble(1024).lines().nth(4).unwrap(),
               "#define LUTGEN_INDEX(x) ((int32_t)((x) * LUTGEN_RESOLUTION) % LUTGEN_RESOLUTION)");
}

#[test]
fn lines_hold_at_most_sixteen_literals() {
    let wt = TableBuilder::new(1024).unwrap().build(&Waveform::ALL).unwrap();
    let header = default_writer().render(&wt).unwrap();
    let literal_lines: Vec<&str> = header.lines().filter(|l| l.starts_with("    ")).collect();
    assert_eq!(literal_lines.len(), 8 * 64);
    for line in literal_lines {
        assert_eq!(line.matches('f').count(), 16);
        assert!(line.ends_with("f,"));
    }
}

#[test]
fn tables_appear_once_in_canonical_order() {
    let wt = TableBuilder::new(64).unwrap().build(&Waveform::ALL).unwrap();
    let header = default_writer().render(&wt).unwrap();
    let mut last_pos = 0;
    for wave in Waveform::ALL.iter() {
        let decl = format!("IRAM_ATTR float lutgen_{}[64] = {{", wave.name());
        assert_eq!(header.matches(&decl).count(), 1, "{}", wave);
        let pos = header.find(&decl).unwrap();
        assert!(pos > last_pos);
        last_pos = pos;
    }
}

#[test]
fn literals_round_trip() {
    let wt = TableBuilder::new(1024).unwrap().build(&Waveform::ALL).unwrap();
    let writer = default_writer();
    for (wave, table) in wt.iter() {
        let text = writer.render_table(wave.name(), table);
        let body: Vec<&str> = text.lines().filter(|l| l.starts_with("    ")).collect();
        let parsed: Vec<Float> = body.into_iter()
            .flat_map(|l| l.trim().trim_end_matches(',').split(','))
            .map(|lit| lit.trim_end_matches('f').parse::<Float>().unwrap())
            .collect();
        assert_eq!(parsed.len(), table.len());
        for (p, v) in parsed.iter().zip(table.iter()) {
            assert!((p - v).abs() <= 0.5e-10 + 1e-15, "{}: {} vs {}", wave, p, v);
        }
    }
}

#[test]
fn wrong_length_writes_nothing() {
    let dir = test_dir("mismatch");
    let path = dir.join("luts.hpp");
    let mut wt = TableBuilder::new(32).unwrap().build(&Waveform::ALL).unwrap();
    wt.tables[3].1.pop();
    let result = default_writer().write_file(&wt, &path);
    match result {
        Err(LutError::TableLength { waveform, expected, actual }) => {
            assert_eq!(waveform, Waveform::Tri);
            assert_eq!(expected, 32);
            assert_eq!(actual, 31);
        }
        _ => panic!("Expected length error"),
    }
    assert!(!path.exists());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn failed_check_keeps_existing_file() {
    let dir = test_dir("keep");
    let path = dir.join("luts.hpp");
    fs::write(&path, "previous").unwrap();
    let wt = Wavetable::from_tables(8, vec![(Waveform::Sin, vec![0.0; 9])]);
    assert!(default_writer().write_file(&wt, &path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
}

#[test]
fn output_is_identical_on_rerun() {
    let dir = test_dir("idempotent");
    let path = dir.join("luts.hpp");
    let writer = default_writer();
    let wt = TableBuilder::new(1024).unwrap().build(&Waveform::ALL).unwrap();
    writer.write_file(&wt, &path).unwrap();
    let first = fs::read(&path).unwrap();
    let wt = TableBuilder::new(1024).unwrap().build(&Waveform::ALL).unwrap();
    writer.write_file(&wt, &path).unwrap();
    let second = fs::read(&path).unwrap();
    assert!(first == second);
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
}

#[test]
fn unwritable_destination_is_reported() {
    let dir = test_dir("unwritable");
    let path = dir.join("missing").join("luts.hpp");
    let wt = TableBuilder::new(8).unwrap().build(&[Waveform::Sin]).unwrap();
    match default_writer().write_file(&wt, &path) {
        Err(LutError::Io { path: p, .. }) => assert!(p.starts_with(dir.join("missing"))),
        _ => panic!("Expected I/O error"),
    }
}
