//! The 256-byte Gadget-2 snapshot header.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{GadgetError, Result};

/// Number of particle species slots in the header.
pub const N_SPECIES: usize = 6;

/// Header record payload size in bytes.
const HEADER_SIZE: u32 = 256;

/// Bytes of the header actually carrying fields we parse; the rest is
/// reserved padding.
const PARSED_BYTES: u32 = 160;

/// Parsed Gadget-2 snapshot header.
///
/// Species slots follow the Gadget convention: 0 gas, 1 halo (dark
/// matter), 2 disk, 3 bulge, 4 stars, 5 boundary. Pure N-body runs put
/// everything in slot 1.
#[derive(Debug, Clone, PartialEq)]
pub struct GadgetHeader {
    /// Particles of each species in this file.
    pub npart: [u32; N_SPECIES],
    /// Uniform mass per species; 0 means per-particle masses (unsupported
    /// here — N-body snapshots carry uniform masses).
    pub mass: [f64; N_SPECIES],
    /// Expansion factor (or simulation time for non-cosmological runs).
    pub time: f64,
    pub redshift: f64,
    pub flag_sfr: i32,
    pub flag_feedback: i32,
    /// Particles of each species across all files of the snapshot.
    pub npart_total: [u32; N_SPECIES],
    pub flag_cooling: i32,
    pub num_files: i32,
    pub box_size: f64,
    pub omega0: f64,
    pub omega_lambda: f64,
    pub hubble_param: f64,
}

impl GadgetHeader {
    /// Reads the header record, validating both length markers.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let leading = reader.read_u32::<LittleEndian>()?;
        if leading != HEADER_SIZE {
            return Err(GadgetError::InvalidHeaderLength {
                expected: HEADER_SIZE,
                got: leading,
            });
        }

        let mut npart = [0u32; N_SPECIES];
        reader.read_u32_into::<LittleEndian>(&mut npart)?;
        let mut mass = [0f64; N_SPECIES];
        reader.read_f64_into::<LittleEndian>(&mut mass)?;
        let time = reader.read_f64::<LittleEndian>()?;
        let redshift = reader.read_f64::<LittleEndian>()?;
        let flag_sfr = reader.read_i32::<LittleEndian>()?;
        let flag_feedback = reader.read_i32::<LittleEndian>()?;
        let mut npart_total = [0u32; N_SPECIES];
        reader.read_u32_into::<LittleEndian>(&mut npart_total)?;
        let flag_cooling = reader.read_i32::<LittleEndian>()?;
        let num_files = reader.read_i32::<LittleEndian>()?;
        let box_size = reader.read_f64::<LittleEndian>()?;
        let omega0 = reader.read_f64::<LittleEndian>()?;
        let omega_lambda = reader.read_f64::<LittleEndian>()?;
        let hubble_param = reader.read_f64::<LittleEndian>()?;

        let mut padding = vec![0u8; (HEADER_SIZE - PARSED_BYTES) as usize];
        reader.read_exact(&mut padding)?;

        let trailing = reader.read_u32::<LittleEndian>()?;
        if trailing != leading {
            return Err(GadgetError::RecordMarkerMismatch { leading, trailing });
        }

        Ok(Self {
            npart,
            mass,
            time,
            redshift,
            flag_sfr,
            flag_feedback,
            npart_total,
            flag_cooling,
            num_files,
            box_size,
            omega0,
            omega_lambda,
            hubble_param,
        })
    }

    /// Writes the header record including both length markers.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(HEADER_SIZE)?;
        for n in self.npart {
            writer.write_u32::<LittleEndian>(n)?;
        }
        for m in self.mass {
            writer.write_f64::<LittleEndian>(m)?;
        }
        writer.write_f64::<LittleEndian>(self.time)?;
        writer.write_f64::<LittleEndian>(self.redshift)?;
        writer.write_i32::<LittleEndian>(self.flag_sfr)?;
        writer.write_i32::<LittleEndian>(self.flag_feedback)?;
        for n in self.npart_total {
            writer.write_u32::<LittleEndian>(n)?;
        }
        writer.write_i32::<LittleEndian>(self.flag_cooling)?;
        writer.write_i32::<LittleEndian>(self.num_files)?;
        writer.write_f64::<LittleEndian>(self.box_size)?;
        writer.write_f64::<LittleEndian>(self.omega0)?;
        writer.write_f64::<LittleEndian>(self.omega_lambda)?;
        writer.write_f64::<LittleEndian>(self.hubble_param)?;
        writer.write_all(&vec![0u8; (HEADER_SIZE - PARSED_BYTES) as usize])?;
        writer.write_u32::<LittleEndian>(HEADER_SIZE)?;
        Ok(())
    }

    /// Total particle count in this file, all species.
    pub fn total_particles(&self) -> u64 {
        self.npart.iter().map(|&n| n as u64).sum()
    }

    /// Uniform particle mass: the mass of the first species with particles
    /// present and a nonzero mass entry.
    pub fn uniform_particle_mass(&self) -> Option<f64> {
        (0..N_SPECIES)
            .find(|&i| self.npart[i] > 0 && self.mass[i] > 0.0)
            .map(|i| self.mass[i])
    }
}

impl Default for GadgetHeader {
    fn default() -> Self {
        Self {
            npart: [0; N_SPECIES],
            mass: [0.0; N_SPECIES],
            time: 0.0,
            redshift: 0.0,
            flag_sfr: 0,
            flag_feedback: 0,
            npart_total: [0; N_SPECIES],
            flag_cooling: 0,
            num_files: 1,
            box_size: 0.0,
            omega0: 0.0,
            omega_lambda: 0.0,
            hubble_param: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn dm_only_header(n: u32) -> GadgetHeader {
        GadgetHeader {
            npart: [0, n, 0, 0, 0, 0],
            mass: [0.0, 1.36e9, 0.0, 0.0, 0.0, 0.0],
            time: 1.0,
            redshift: 0.0,
            npart_total: [0, n, 0, 0, 0, 0],
            box_size: 100.0,
            omega0: 0.308,
            omega_lambda: 0.692,
            hubble_param: 0.678,
            ..Default::default()
        }
    }

    #[test]
    fn test_header_round_trip() {
        let header = dm_only_header(4096);
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        // payload + two markers
        assert_eq!(buf.len(), 256 + 8);

        let parsed = GadgetHeader::read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_total_particles_sums_species() {
        let mut header = dm_only_header(100);
        header.npart[4] = 50;
        assert_eq!(header.total_particles(), 150);
    }

    #[test]
    fn test_uniform_particle_mass_skips_empty_species() {
        let header = dm_only_header(100);
        assert_eq!(header.uniform_particle_mass(), Some(1.36e9));

        let empty = GadgetHeader::default();
        assert_eq!(empty.uniform_particle_mass(), None);
    }

    #[test]
    fn test_bad_leading_marker() {
        let header = dm_only_header(10);
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        buf[0..4].copy_from_slice(&123u32.to_le_bytes());

        let err = GadgetHeader::read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, GadgetError::InvalidHeaderLength { got: 123, .. }));
    }

    #[test]
    fn test_marker_mismatch() {
        let header = dm_only_header(10);
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        let end = buf.len();
        buf[end - 4..].copy_from_slice(&0u32.to_le_bytes());

        let err = GadgetHeader::read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, GadgetError::RecordMarkerMismatch { .. }));
    }

    #[test]
    fn test_truncated_header_is_io_error() {
        let header = dm_only_header(10);
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        buf.truncate(40);

        let err = GadgetHeader::read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, GadgetError::Io(_)));
    }
}
