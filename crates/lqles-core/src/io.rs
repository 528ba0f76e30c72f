// ─────────────────────────────────────────────────────────────────────
// L-QLES — Persistence
// Copyright 2024 Rolls-Royce plc
// License: BSD 3-Clause
// ─────────────────────────────────────────────────────────────────────
//! Writing generated systems to disk.
//!
//! Binary matrix layout, all little-endian:
//!
//! | field      | type        | count  |
//! |------------|-------------|--------|
//! | real flag  | u8 (1)      | 1      |
//! | rows, cols | i64         | 2      |
//! | nnz        | i64         | 1      |
//! | values     | f64         | nnz    |
//! | columns    | i64         | nnz    |
//! | row ptr    | i64         | rows+1 |
//!
//! Vectors are an i64 length followed by the f64 values. Only nonzero
//! matrix entries are written.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use lqles_math::sparse::{from_csr_data, CsrMatrix, CsrOps};
use lqles_types::error::{LqlesError, LqlesResult};
use ndarray::{arr0, Array1, Ix0, Ix1, OwnedRepr};
use ndarray_npy::{
    write_npy, NpzReader, NpzWriter, ReadDataError, ReadableElement, WritableElement, WriteDataError,
};

use crate::case::CaseResult;

fn to_i64(v: usize) -> LqlesResult<i64> {
    i64::try_from(v).map_err(|_| LqlesError::LinAlg(format!("{v} does not fit in i64")))
}

fn to_usize(v: i64, what: &str) -> LqlesResult<usize> {
    usize::try_from(v).map_err(|_| {
        LqlesError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("negative {what}: {v}"),
        ))
    })
}

fn invalid_data(msg: String) -> LqlesError {
    LqlesError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, msg))
}

fn write_i64s<W: Write>(w: &mut W, values: &[usize]) -> LqlesResult<()> {
    for &v in values {
        w.write_all(&to_i64(v)?.to_le_bytes())?;
    }
    Ok(())
}

fn read_i64<R: Read>(r: &mut R) -> LqlesResult<i64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_f64<R: Read>(r: &mut R) -> LqlesResult<f64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Write `a` in the binary CSR layout.
pub fn write_csr_bin<W: Write>(w: &mut W, a: &CsrMatrix) -> LqlesResult<()> {
    let a = a.drop_zeros();
    w.write_all(&[1u8])?;
    write_i64s(w, &[a.nrows(), a.ncols(), a.nnz()])?;
    for v in a.values() {
        w.write_all(&v.to_le_bytes())?;
    }
    write_i64s(w, a.col_indices())?;
    write_i64s(w, a.row_offsets())?;
    Ok(())
}

pub fn write_vector_bin<W: Write>(w: &mut W, v: &[f64]) -> LqlesResult<()> {
    w.write_all(&to_i64(v.len())?.to_le_bytes())?;
    for x in v {
        w.write_all(&x.to_le_bytes())?;
    }
    Ok(())
}

/// Read a matrix written by [`write_csr_bin`].
pub fn read_csr_bin<R: Read>(r: &mut R) -> LqlesResult<CsrMatrix> {
    let mut flag = [0u8; 1];
    r.read_exact(&mut flag)?;
    if flag[0] != 1 {
        return Err(invalid_data(format!("unsupported matrix flag {}", flag[0])));
    }
    let nrows = to_usize(read_i64(r)?, "row count")?;
    let ncols = to_usize(read_i64(r)?, "column count")?;
    let nnz = to_usize(read_i64(r)?, "nnz")?;

    let values = (0..nnz).map(|_| read_f64(r)).collect::<LqlesResult<Vec<_>>>()?;
    let cols = (0..nnz)
        .map(|_| read_i64(r).and_then(|c| to_usize(c, "column index")))
        .collect::<LqlesResult<Vec<_>>>()?;
    let row_ptr = (0..=nrows)
        .map(|_| read_i64(r).and_then(|p| to_usize(p, "row pointer")))
        .collect::<LqlesResult<Vec<_>>>()?;

    from_csr_data(nrows, ncols, row_ptr, cols, values)
        .map_err(|e| invalid_data(format!("malformed matrix: {e}")))
}

pub fn read_vector_bin<R: Read>(r: &mut R) -> LqlesResult<Vec<f64>> {
    let n = to_usize(read_i64(r)?, "vector length")?;
    (0..n).map(|_| read_f64(r)).collect()
}

fn create(path: &Path) -> LqlesResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write `<stem>_mat.bin`, `<stem>_rhs.bin`, `<stem>_sol.bin` (when a
/// solution exists) and `<stem>_ord.bin` (Q, when reordered) into `dir`.
/// Returns the paths written.
pub fn save_case_bin(dir: &Path, result: &CaseResult) -> LqlesResult<Vec<PathBuf>> {
    let stem = result.output_stem();
    let system = result.output_system();
    let mut written = Vec::new();

    let path = dir.join(format!("{stem}_mat.bin"));
    let mut w = create(&path)?;
    write_csr_bin(&mut w, &system.a)?;
    w.flush()?;
    written.push(path);

    let path = dir.join(format!("{stem}_rhs.bin"));
    let mut w = create(&path)?;
    write_vector_bin(&mut w, &system.b)?;
    w.flush()?;
    written.push(path);

    if let Some(x) = &result.solution {
        let path = dir.join(format!("{stem}_sol.bin"));
        let mut w = create(&path)?;
        write_vector_bin(&mut w, x)?;
        w.flush()?;
        written.push(path);
    }

    if let Some(reordered) = &result.reordered {
        let path = dir.join(format!("{stem}_ord.bin"));
        let mut w = create(&path)?;
        write_csr_bin(&mut w, &reordered.q())?;
        w.flush()?;
        written.push(path);
    }

    for path in &written {
        log::info!("saved {}", path.display());
    }
    Ok(written)
}

/// Write `v` as a 1-D `.npy` array.
pub fn save_vector_npy(path: &Path, v: &[f64]) -> LqlesResult<()> {
    write_npy(path, &Array1::from(v.to_vec()))
        .map_err(|e| LqlesError::Npy(format!("failed to write '{}': {e}", path.display())))
}

/// Fixed-width byte string (`|S<N>`), the dtype scipy uses for the
/// `format` entry of a sparse `.npz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteString<const N: usize>([u8; N]);

impl<const N: usize> WritableElement for ByteString<N> {
    fn type_descriptor() -> py_literal::Value {
        py_literal::Value::String(format!("|S{N}"))
    }

    fn write<W: Write>(&self, mut writer: W) -> Result<(), WriteDataError> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    fn write_slice<W: Write>(slice: &[Self], mut writer: W) -> Result<(), WriteDataError> {
        for s in slice {
            writer.write_all(&s.0)?;
        }
        Ok(())
    }
}

impl<const N: usize> ReadableElement for ByteString<N> {
    fn read_to_end_exact_vec<R: Read>(
        mut reader: R,
        type_desc: &py_literal::Value,
        len: usize,
    ) -> Result<Vec<Self>, ReadDataError> {
        match type_desc {
            py_literal::Value::String(s) if *s == format!("|S{N}") => {}
            other => return Err(ReadDataError::WrongDescriptor(other.clone())),
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            let mut buf = [0u8; N];
            reader.read_exact(&mut buf).map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => ReadDataError::MissingData,
                _ => ReadDataError::Io(e),
            })?;
            out.push(ByteString(buf));
        }
        let extra = reader.read_to_end(&mut Vec::new()).map_err(ReadDataError::Io)?;
        if extra > 0 {
            return Err(ReadDataError::ExtraBytes(extra));
        }
        Ok(out)
    }
}

fn npz_error(path: &Path) -> impl Fn(ndarray_npy::WriteNpzError) -> LqlesError + '_ {
    move |e| LqlesError::Npy(format!("failed to write '{}': {e}", path.display()))
}

/// Write `a` like `scipy.sparse.save_npz`: arrays `data`, `indices`,
/// `indptr`, `shape` and the byte string `format = b"csr"`.
pub fn write_csr_npz(path: &Path, a: &CsrMatrix) -> LqlesResult<()> {
    let a = a.drop_zeros();
    let to_array = |v: &[usize]| -> LqlesResult<Array1<i64>> {
        v.iter().map(|&x| to_i64(x)).collect::<LqlesResult<Vec<_>>>().map(Array1::from)
    };
    let err = npz_error(path);

    let mut npz = NpzWriter::new(create(path)?);
    npz.add_array("indices", &to_array(a.col_indices())?).map_err(&err)?;
    npz.add_array("indptr", &to_array(a.row_offsets())?).map_err(&err)?;
    npz.add_array("format", &arr0(ByteString(*b"csr"))).map_err(&err)?;
    npz.add_array("shape", &to_array(&[a.nrows(), a.ncols()])?).map_err(&err)?;
    npz.add_array("data", &Array1::from(a.values().to_vec())).map_err(&err)?;
    npz.finish().map_err(&err)?.flush()?;
    Ok(())
}

/// Read a matrix written by [`write_csr_npz`] (or by
/// `scipy.sparse.save_npz` with 64-bit indices).
pub fn read_csr_npz(path: &Path) -> LqlesResult<CsrMatrix> {
    let mut npz = NpzReader::new(BufReader::new(File::open(path)?))
        .map_err(|e| LqlesError::Npy(format!("failed to open '{}': {e}", path.display())))?;
    let format = npz
        .by_name::<OwnedRepr<ByteString<3>>, Ix0>("format.npy")
        .or_else(|_| npz.by_name::<OwnedRepr<ByteString<3>>, Ix0>("format"))
        .map_err(|e| LqlesError::Npy(format!("missing array 'format': {e}")))?
        .into_scalar();
    if format.0 != *b"csr" {
        return Err(invalid_data(format!(
            "expected a csr matrix, got format {:?}",
            String::from_utf8_lossy(&format.0)
        )));
    }
    let mut index_array = |key: &str| -> LqlesResult<Vec<usize>> {
        let array = npz
            .by_name::<OwnedRepr<i64>, Ix1>(&format!("{key}.npy"))
            .or_else(|_| npz.by_name::<OwnedRepr<i64>, Ix1>(key))
            .map_err(|e| LqlesError::Npy(format!("missing array '{key}': {e}")))?;
        array.iter().map(|&v| to_usize(v, key)).collect()
    };
    let indices = index_array("indices")?;
    let indptr = index_array("indptr")?;
    let shape = index_array("shape")?;
    let data = npz
        .by_name::<OwnedRepr<f64>, Ix1>("data.npy")
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix1>("data"))
        .map_err(|e| LqlesError::Npy(format!("missing array 'data': {e}")))?;

    let &[nrows, ncols] = shape.as_slice() else {
        return Err(invalid_data(format!("shape must have 2 entries, got {}", shape.len())));
    };
    from_csr_data(nrows, ncols, indptr, indices, data.to_vec())
}

/// Write the case the way numpy consumers expect it: `<stem>_mat.npz`,
/// `<stem>_rhs.npy`, `<stem>_sol.npy` (when a solution exists) and
/// `<stem>_ord.npz` (Q, when reordered). Returns the paths written.
pub fn save_case_npz(dir: &Path, result: &CaseResult) -> LqlesResult<Vec<PathBuf>> {
    let stem = result.output_stem();
    let system = result.output_system();
    let mut written = Vec::new();

    let path = dir.join(format!("{stem}_mat.npz"));
    write_csr_npz(&path, &system.a)?;
    written.push(path);

    let path = dir.join(format!("{stem}_rhs.npy"));
    save_vector_npy(&path, &system.b)?;
    written.push(path);

    if let Some(x) = &result.solution {
        let path = dir.join(format!("{stem}_sol.npy"));
        save_vector_npy(&path, x)?;
        written.push(path);
    }

    if let Some(reordered) = &result.reordered {
        let path = dir.join(format!("{stem}_ord.npz"));
        write_csr_npz(&path, &reordered.q())?;
        written.push(path);
    }

    for path in &written {
        log::info!("saved {}", path.display());
    }
    Ok(written)
}
