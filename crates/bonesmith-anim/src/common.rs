use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Trait for parsing and writing types to and from the skeleton/motion binary formats.
///
/// All numeric fields are 4-byte little-endian and there is no alignment
/// padding, so a plain `Read`/`Write` is enough; no seeking is required.
pub trait BinaryFormat {
    /// Parse an instance of the type from the given reader.
    fn parse<R: Read>(reader: &mut R) -> Result<Self>
    where
        Self: Sized;

    /// Write this instance to the given writer.
    fn write<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Load an instance from a file on disk
    fn load<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        log::debug!("Loading {}", path.display());
        let mut reader = BufReader::new(File::open(path)?);
        Self::parse(&mut reader)
    }

    /// Save this instance to a file on disk
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::debug!("Saving {}", path.display());
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize into an in-memory buffer
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }
}
