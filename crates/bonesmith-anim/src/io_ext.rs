//! Little-endian read/write helpers for the skeleton and motion file formats

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Mat4, Vec3};
use std::io::{self, Read, Write};

use crate::error::{AnimError, Result};

/// Upper bound on a stored name, guards against reading a whole corrupt file as one string
const MAX_NAME_LENGTH: usize = 1024;

/// Reader extension for the primitives used by the animation file formats
pub trait ReadExt: Read {
    fn read_i32_le(&mut self) -> io::Result<i32> {
        self.read_i32::<LittleEndian>()
    }

    fn read_f32_le(&mut self) -> io::Result<f32> {
        self.read_f32::<LittleEndian>()
    }

    fn read_vec3(&mut self) -> io::Result<Vec3> {
        let x = self.read_f32_le()?;
        let y = self.read_f32_le()?;
        let z = self.read_f32_le()?;
        Ok(Vec3::new(x, y, z))
    }

    /// Read a 4x4 matrix stored as 16 consecutive floats.
    ///
    /// The on-disk layout is a row-major matrix for row vectors, which is the
    /// same memory layout as a column-major matrix for column vectors.
    fn read_mat4(&mut self) -> io::Result<Mat4> {
        let mut cells = [0.0f32; 16];
        self.read_f32_into::<LittleEndian>(&mut cells)?;
        Ok(Mat4::from_cols_array(&cells))
    }

    /// Read a NUL-terminated UTF-8 string
    fn read_cstring(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            let byte = self.read_u8()?;
            if byte == 0 {
                break;
            }
            if bytes.len() >= MAX_NAME_LENGTH {
                return Err(AnimError::InvalidString(format!(
                    "string exceeds {MAX_NAME_LENGTH} bytes without terminator"
                )));
            }
            bytes.push(byte);
        }
        String::from_utf8(bytes).map_err(|e| AnimError::InvalidString(e.to_string()))
    }

    /// Read a signed element count, rejecting negative values
    fn read_count(&mut self, what: &'static str) -> Result<usize> {
        let count = self.read_i32_le()?;
        usize::try_from(count).map_err(|_| AnimError::NegativeCount { what, count })
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Writer extension mirroring [`ReadExt`]
pub trait WriteExt: Write {
    fn write_i32_le(&mut self, value: i32) -> io::Result<()> {
        self.write_i32::<LittleEndian>(value)
    }

    fn write_f32_le(&mut self, value: f32) -> io::Result<()> {
        self.write_f32::<LittleEndian>(value)
    }

    fn write_vec3(&mut self, v: Vec3) -> io::Result<()> {
        self.write_f32_le(v.x)?;
        self.write_f32_le(v.y)?;
        self.write_f32_le(v.z)
    }

    fn write_mat4(&mut self, m: &Mat4) -> io::Result<()> {
        for cell in m.to_cols_array() {
            self.write_f32_le(cell)?;
        }
        Ok(())
    }

    fn write_cstring(&mut self, s: &str) -> Result<()> {
        if s.as_bytes().contains(&0) {
            return Err(AnimError::InvalidString(format!(
                "'{}' contains an interior NUL byte",
                s.escape_debug()
            )));
        }
        self.write_all(s.as_bytes())?;
        self.write_u8(0)?;
        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = i32::try_from(count)
            .map_err(|_| AnimError::ParseError(format!("count {count} does not fit in i32")))?;
        self.write_i32_le(count)?;
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteExt for W {}
