//! Snapshot position block access.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{GadgetError, GadgetHeader, Result};

/// One particle from a snapshot.
///
/// Ids are sequential read order (the original files this pipeline
/// consumes carry no id block); mass is uniform and lives in the header.
/// Positions are widened to f64 so downstream distance math stays in one
/// precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An opened snapshot: header parsed, file positioned at the position
/// block.
pub struct Snapshot {
    pub header: GadgetHeader,
    reader: BufReader<File>,
}

impl Snapshot {
    /// Opens a snapshot and parses its header. No particle data is read
    /// until [`read_positions`](Self::read_positions).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let header = GadgetHeader::read_from(&mut reader)?;
        Ok(Self { header, reader })
    }

    /// Reads the position record into particle records.
    ///
    /// # Errors
    /// Fails when the record length disagrees with the header particle
    /// count or the trailing marker does not match.
    pub fn read_positions(&mut self) -> Result<Vec<Particle>> {
        let count = self.header.total_particles();
        if count == 0 {
            return Err(GadgetError::NoParticles);
        }

        let leading = self.reader.read_u32::<LittleEndian>()?;
        let expected = count * 3 * std::mem::size_of::<f32>() as u64;
        if leading as u64 != expected {
            return Err(GadgetError::PositionBlockSize {
                expected,
                got: leading as u64,
                count,
            });
        }

        let mut particles = Vec::with_capacity(count as usize);
        let mut pos = [0f32; 3];
        for id in 0..count as i64 {
            self.reader.read_f32_into::<LittleEndian>(&mut pos)?;
            particles.push(Particle {
                id,
                x: pos[0] as f64,
                y: pos[1] as f64,
                z: pos[2] as f64,
            });
        }

        let trailing = self.reader.read_u32::<LittleEndian>()?;
        if trailing != leading {
            return Err(GadgetError::RecordMarkerMismatch { leading, trailing });
        }

        Ok(particles)
    }

    /// Writes a minimal snapshot (header + position block). Used to build
    /// fixtures and by tests; real snapshots carry further records that
    /// this pipeline never reads.
    pub fn write(
        path: impl AsRef<Path>,
        header: &GadgetHeader,
        positions: &[[f32; 3]],
    ) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        header.write_to(&mut writer)?;

        let marker = (positions.len() * 3 * std::mem::size_of::<f32>()) as u32;
        writer.write_u32::<LittleEndian>(marker)?;
        for pos in positions {
            for &c in pos {
                writer.write_f32::<LittleEndian>(c)?;
            }
        }
        writer.write_u32::<LittleEndian>(marker)?;
        writer.flush()?;
        Ok(())
    }
}

/// Sorts particles by their x coordinate — the precondition for the
/// windowed candidate search in the profile code.
pub fn sort_by_x(particles: &mut [Particle]) {
    particles.sort_unstable_by(|a, b| a.x.total_cmp(&b.x));
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn dm_header(n: u32) -> GadgetHeader {
        GadgetHeader {
            npart: [0, n, 0, 0, 0, 0],
            mass: [0.0, 2.5e9, 0.0, 0.0, 0.0, 0.0],
            time: 1.0,
            npart_total: [0, n, 0, 0, 0, 0],
            box_size: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_and_read_positions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap_000");
        let positions = [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        Snapshot::write(&path, &dm_header(3), &positions).unwrap();

        let mut snapshot = Snapshot::open(&path).unwrap();
        assert_eq!(snapshot.header.total_particles(), 3);
        assert_eq!(snapshot.header.uniform_particle_mass(), Some(2.5e9));

        let particles = snapshot.read_positions().unwrap();
        assert_eq!(particles.len(), 3);
        assert_eq!(particles[0].id, 0);
        assert_eq!(particles[2].id, 2);
        assert_eq!(particles[1].x, 4.0);
        assert_eq!(particles[2].z, 9.0);
    }

    #[test]
    fn test_position_block_size_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap_bad");
        // Header says 5 particles, block carries 3.
        Snapshot::write(
            &path,
            &dm_header(5),
            &[[0.0; 3], [1.0; 3], [2.0; 3]],
        )
        .unwrap();

        let mut snapshot = Snapshot::open(&path).unwrap();
        let err = snapshot.read_positions().unwrap_err();
        assert!(matches!(err, GadgetError::PositionBlockSize { count: 5, .. }));
    }

    #[test]
    fn test_empty_snapshot_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap_empty");
        Snapshot::write(&path, &dm_header(0), &[]).unwrap();

        let mut snapshot = Snapshot::open(&path).unwrap();
        assert!(matches!(
            snapshot.read_positions().unwrap_err(),
            GadgetError::NoParticles
        ));
    }

    #[test]
    fn test_sort_by_x() {
        let mut particles = vec![
            Particle { id: 0, x: 5.0, y: 0.0, z: 0.0 },
            Particle { id: 1, x: 1.0, y: 0.0, z: 0.0 },
            Particle { id: 2, x: 3.0, y: 0.0, z: 0.0 },
        ];
        sort_by_x(&mut particles);
        let xs: Vec<f64> = particles.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 3.0, 5.0]);
        assert_eq!(particles[0].id, 1);
    }
}
