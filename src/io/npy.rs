// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Minimal NumPy `.npy` codec for 2D `u8` grids.
//!
//! Writes format version 1.0 with dtype `|u1` in C order. Reads versions
//! 1.0, 2.0 and 3.0, dtypes `|u1`, `<u1`, `>u1` and `|b1`, in either memory order.

use ndarray::{Array2, ShapeBuilder};
use std::io::{Read, Write};
use thiserror::Error;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGNMENT: usize = 64;
const MAX_HEADER_LEN: usize = 1 << 16;

#[derive(Debug, Error)]
pub enum NpyError {
    #[error("not an .npy file")]
    BadMagic,

    #[error("unsupported .npy version {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("malformed header: {0}")]
    Header(String),

    #[error("unsupported dtype '{0}', expected an 8-bit unsigned or bool array")]
    UnsupportedDtype(String),

    #[error("expected a 2D array, found shape {0:?}")]
    NotTwoDimensional(Vec<usize>),

    #[error("array data is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Encode `grid` as an `.npy` v1.0 stream.
pub fn write_u8<W: Write>(mut writer: W, grid: &Array2<u8>) -> std::io::Result<()> {
    let (rows, cols) = grid.dim();
    let mut header = format!(
        "{{'descr': '|u1', 'fortran_order': False, 'shape': ({rows}, {cols}), }}"
    );
    // magic + version + u16 length + header + '\n' must be a multiple of 64
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');

    writer.write_all(MAGIC)?;
    writer.write_all(&[1, 0])?;
    writer.write_all(&(header.len() as u16).to_le_bytes())?;
    writer.write_all(header.as_bytes())?;

    match grid.as_slice() {
        Some(data) => writer.write_all(data)?,
        None => {
            let data: Vec<u8> = grid.iter().copied().collect();
            writer.write_all(&data)?;
        }
    }
    writer.flush()
}

/// Decode an `.npy` stream holding a 2D 8-bit array.
pub fn read_u8<R: Read>(mut reader: R) -> Result<Array2<u8>, NpyError> {
    let header = read_header(&mut reader)?;
    read_data(reader, &header)
}

/// Parsed `.npy` header of a 2D 8-bit array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub rows: usize,
    pub cols: usize,
    fortran_order: bool,
}

/// Read and validate the header, leaving `reader` at the start of the data.
pub fn read_header<R: Read>(reader: &mut R) -> Result<Header, NpyError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic).map_err(|_| NpyError::BadMagic)?;
    if &magic != MAGIC {
        return Err(NpyError::BadMagic);
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let header_len = match version {
        [1, 0] => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len)?;
            u16::from_le_bytes(len) as usize
        }
        [2, 0] | [3, 0] => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len)?;
            u32::from_le_bytes(len) as usize
        }
        [major, minor] => return Err(NpyError::UnsupportedVersion(major, minor)),
    };
    if header_len > MAX_HEADER_LEN {
        return Err(NpyError::Header(format!(
            "header length {header_len} exceeds {MAX_HEADER_LEN} bytes"
        )));
    }

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header)?;
    let header = String::from_utf8(header)
        .map_err(|_| NpyError::Header("header is not valid text".to_string()))?;
    let parsed = ParsedHeader::parse(&header)?;

    let (rows, cols) = match parsed.shape.as_slice() {
        [rows, cols] => (*rows, *cols),
        other => return Err(NpyError::NotTwoDimensional(other.to_vec())),
    };
    if rows.checked_mul(cols).is_none() {
        return Err(NpyError::Header(format!(
            "shape ({rows}, {cols}) is too large"
        )));
    }

    Ok(Header {
        rows,
        cols,
        fortran_order: parsed.fortran_order,
    })
}

/// Read the array body described by `header`.
///
/// Memory grows with the bytes actually present, never with the declared
/// shape alone.
pub fn read_data<R: Read>(reader: R, header: &Header) -> Result<Array2<u8>, NpyError> {
    let expected = header
        .rows
        .checked_mul(header.cols)
        .ok_or_else(|| NpyError::Header("shape is too large".to_string()))?;

    let mut data = Vec::new();
    reader.take(expected as u64).read_to_end(&mut data)?;
    if data.len() < expected {
        return Err(NpyError::Truncated {
            expected,
            found: data.len(),
        });
    }

    let shape = (header.rows, header.cols).set_f(header.fortran_order);
    Array2::from_shape_vec(shape, data).map_err(|e| NpyError::Header(e.to_string()))
}

#[derive(Debug)]
struct ParsedHeader {
    fortran_order: bool,
    shape: Vec<usize>,
}

impl ParsedHeader {
    fn parse(text: &str) -> Result<Self, NpyError> {
        let descr = dict_value(text, "descr")?;
        let descr = descr.trim_matches(|c| c == '\'' || c == '"');
        if !matches!(descr, "|u1" | "<u1" | ">u1" | "u1" | "|b1" | "b1") {
            return Err(NpyError::UnsupportedDtype(descr.to_string()));
        }

        let fortran_order = match dict_value(text, "fortran_order")? {
            "True" => true,
            "False" => false,
            other => {
                return Err(NpyError::Header(format!(
                    "fortran_order must be True or False, found '{other}'"
                )))
            }
        };

        let shape = dict_value(text, "shape")?;
        let inner = shape
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| NpyError::Header(format!("shape is not a tuple: '{shape}'")))?;
        let shape = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.trim_end_matches('L')
                    .parse::<usize>()
                    .map_err(|_| NpyError::Header(format!("bad shape entry '{s}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            fortran_order,
            shape,
        })
    }
}

/// Extract the raw value text for `key` from a Python dict literal.
fn dict_value<'a>(text: &'a str, key: &str) -> Result<&'a str, NpyError> {
    let missing = || NpyError::Header(format!("missing key '{key}'"));
    let start = text
        .find(&format!("'{key}'"))
        .or_else(|| text.find(&format!("\"{key}\"")))
        .ok_or_else(missing)?;
    let after_key = &text[start + key.len() + 2..];
    let colon = after_key.find(':').ok_or_else(missing)?;
    let rest = after_key[colon + 1..].trim_start();

    let end = if rest.starts_with('(') {
        rest.find(')').map(|i| i + 1)
    } else {
        rest.find([',', '}'])
    }
    .ok_or_else(|| NpyError::Header(format!("unterminated value for '{key}'")))?;
    Ok(rest[..end].trim())
}
