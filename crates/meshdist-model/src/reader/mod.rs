//! Multi-format mesh reading with autodetection.
//!
//! The supported formats are ASCII RAW, OFF, SMF, a VRML 2.0
//! `IndexedFaceSet` subset, and an Inventor 2.x subset. PLY is recognized
//! by the detector but not supported. Each recognizer is a thin
//! line/field parser over the common [`stream::TokenStream`] tokenizer.

mod iv;
mod off;
mod raw;
mod smf;
mod stream;
mod vrml;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use meshdist_core::{MeshError, Result};

use crate::mesh::Mesh;
use stream::TokenStream;

/// A mesh file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// ASCII RAW: a count header followed by vertex, face and optional
    /// normal lines.
    Raw,
    /// VRML 2.0 utf8, `IndexedFaceSet` nodes only.
    Vrml,
    /// Inventor 2.x ascii, `Coordinate3` + `IndexedFaceSet` only.
    Inventor,
    /// SMF (QSlim), `v`/`f` lines with 1-based indices.
    Smf,
    /// Object File Format.
    Off,
    /// PLY; detected but unsupported.
    Ply,
}

/// Reads all meshes from `reader`.
///
/// With no `format` hint the format is autodetected from the first bytes.
/// `concat` applies to VRML inputs holding several `IndexedFaceSet`s: when
/// true they are concatenated into a single mesh, otherwise each becomes
/// its own entry. The other formats always produce exactly one mesh.
pub fn read_model<R: Read>(reader: R, format: Option<Format>, concat: bool) -> Result<Vec<Mesh>> {
    let mut data = TokenStream::new(reader);
    let format = match format {
        Some(f) => f,
        None => detect_format(&mut data)?,
    };
    log::debug!("reading model as {format:?}");
    let meshes = match format {
        Format::Raw => vec![raw::read(&mut data)?],
        Format::Off => vec![off::read(&mut data)?],
        Format::Smf => vec![smf::read(&mut data)?],
        Format::Inventor => vec![iv::read(&mut data)?],
        Format::Vrml => vrml::read(&mut data, concat)?,
        Format::Ply => return Err(MeshError::BadFormat),
    };
    if meshes.is_empty() {
        return Err(MeshError::Model("no triangular mesh in input"));
    }
    Ok(meshes)
}

/// Reads all meshes from the file at `path`. See [`read_model`].
pub fn read_model_file(
    path: impl AsRef<Path>,
    format: Option<Format>,
    concat: bool,
) -> Result<Vec<Mesh>> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|_| MeshError::BadFilename(path.display().to_string()))?;
    read_model(file, format, concat)
}

/// Detects the file format from the first tokens of the stream.
///
/// VRML and Inventor headers are consumed; for the other formats the
/// stream is left (or rewound) so the recognizer can start from the top.
fn detect_format<R: Read>(data: &mut TokenStream<R>) -> Result<Format> {
    let Some(c) = data.getc() else {
        return Err(MeshError::Corrupted);
    };
    match c {
        b'#' => {
            // VRML or Inventor header, or a leading SMF/OFF comment.
            match scan_word(data).as_deref() {
                Some("VRML") => {
                    if data.getc() == Some(b' ')
                        && scan_word(data).as_deref() == Some("V2.0")
                        && data.getc() == Some(b' ')
                        && scan_word(data).as_deref() == Some("utf8")
                        && finish_header_line(data)
                    {
                        Ok(Format::Vrml)
                    } else {
                        Err(MeshError::BadFormat)
                    }
                }
                Some("Inventor") => {
                    if data.getc() == Some(b' ')
                        && scan_word(data).is_some_and(|v| iv_version_ok(&v))
                        && data.getc() == Some(b' ')
                        && scan_word(data).as_deref() == Some("ascii")
                        && finish_header_line(data)
                    {
                        Ok(Format::Inventor)
                    } else {
                        Err(MeshError::BadFormat)
                    }
                }
                _ => detect_headerless(data),
            }
        }
        b'p' => {
            data.unget();
            if scan_word(data).as_deref() == Some("ply")
                && scan_word(data).as_deref() == Some("format")
                && scan_word(data).as_deref() == Some("ascii")
                && scan_word(data).as_deref() == Some("1.0")
            {
                Ok(Format::Ply)
            } else {
                Err(MeshError::BadFormat)
            }
        }
        b'0'..=b'9' => {
            data.unget();
            Ok(Format::Raw)
        }
        _ => {
            data.unget();
            detect_headerless(data)
        }
    }
}

/// Distinguishes SMF from OFF once header lines are ruled out, looking at
/// the first non-comment token. Rewinds so the recognizer re-reads from
/// the top (detection never looks past the first block).
fn detect_headerless<R: Read>(data: &mut TokenStream<R>) -> Result<Format> {
    data.rewind_to_start();
    match data.skip_ws_comm() {
        Some(b'v' | b'f' | b'b' | b'c') => {
            data.rewind_to_start();
            Ok(Format::Smf)
        }
        Some(b'O') => {
            if data.read_word().as_deref() == Some("OFF") {
                data.rewind_to_start();
                Ok(Format::Off)
            } else {
                Err(MeshError::BadFormat)
            }
        }
        _ => Err(MeshError::BadFormat),
    }
}

/// Reads a whitespace-delimited word, skipping leading blanks (but not
/// comments: this runs on header lines where `#` is literal).
fn scan_word<R: Read>(data: &mut TokenStream<R>) -> Option<String> {
    loop {
        match data.getc()? {
            b' ' | b'\t' | b'\n' | b'\r' => {}
            _ => {
                data.unget();
                break;
            }
        }
    }
    data.read_word()
}

/// Consumes the remainder of a header line. The header tokens must be
/// followed by whitespace; anything else fails the header match.
fn finish_header_line<R: Read>(data: &mut TokenStream<R>) -> bool {
    match data.getc() {
        Some(b'\n' | b'\r') => true,
        Some(b' ' | b'\t') => {
            data.skip_to_eol();
            true
        }
        _ => false,
    }
}

fn iv_version_ok(word: &str) -> bool {
    word.strip_prefix('V')
        .and_then(|v| v.parse::<f64>().ok())
        .is_some_and(|v| (2.0..3.0).contains(&v))
}
