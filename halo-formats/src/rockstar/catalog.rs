//! Columnar Rockstar catalog loader.
//!
//! Column types are not declared anywhere in the file, so the loader
//! sniffs each selected column from the first data row: a token that
//! parses as an integer makes an [`ColumnType::Int`] column, anything
//! else that parses as a float makes a [`ColumnType::Float`] column.
//!
//! Some Rockstar versions write one more column tag than the rows carry
//! (the parent-id column is appended by a post-processing step without
//! updating the tag line). When the counts disagree, the tag list is
//! truncated to the row width and a synthetic `PID` tag is appended.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::header::{RockstarHeader, HEADER_ROWS};
use super::{Result, RockstarError};

/// Sentinel id marking "no halo here" in id-indexed arrays, and "no
/// parent" in the PID column.
pub const HALO_NOT_SET: i64 = -1;

/// Per-column storage type, sniffed from one sample row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
}

/// A loaded catalog column.
#[derive(Debug, Clone)]
pub enum Column {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl Column {
    fn with_type(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Int => Column::Int(Vec::new()),
            ColumnType::Float => Column::Float(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int(_) => ColumnType::Int,
            Column::Float(_) => ColumnType::Float,
        }
    }

    /// Value at `i` widened to f64.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            Column::Int(v) => v.get(i).map(|&x| x as f64),
            Column::Float(v) => v.get(i).copied(),
        }
    }

    /// Value at `i` narrowed to i64 (floats are truncated).
    pub fn get_i64(&self, i: usize) -> Option<i64> {
        match self {
            Column::Int(v) => v.get(i).copied(),
            Column::Float(v) => v.get(i).map(|&x| x as i64),
        }
    }

    fn push_token(&mut self, token: &str, line: usize) -> Result<()> {
        let invalid = || RockstarError::InvalidNumber {
            value: token.to_string(),
            line,
        };
        match self {
            Column::Int(v) => v.push(token.parse().map_err(|_| invalid())?),
            Column::Float(v) => v.push(token.parse().map_err(|_| invalid())?),
        }
        Ok(())
    }

    fn retain_mask(&mut self, keep: &[bool]) {
        match self {
            Column::Int(v) => {
                let mut it = keep.iter();
                v.retain(|_| *it.next().unwrap_or(&false));
            }
            Column::Float(v) => {
                let mut it = keep.iter();
                v.retain(|_| *it.next().unwrap_or(&false));
            }
        }
    }
}

/// Infers a column type from one sample token.
fn sniff_type(token: &str) -> Option<ColumnType> {
    if token.parse::<i64>().is_ok() {
        Some(ColumnType::Int)
    } else if token.parse::<f64>().is_ok() {
        Some(ColumnType::Float)
    } else {
        None
    }
}

/// Column selection and row filtering applied at load time.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// When non-empty, load only these columns.
    pub only: Vec<String>,
    /// Columns to skip.
    pub exclude: Vec<String>,
    /// Keep only host halos (`PID == -1`). Requires the PID column to be
    /// among the loaded ones.
    pub only_hosts: bool,
}

impl LoadOptions {
    fn selects(&self, tag: &str) -> bool {
        if !self.only.is_empty() && !self.only.iter().any(|t| t == tag) {
            return false;
        }
        !self.exclude.iter().any(|t| t == tag)
    }
}

/// A Rockstar catalog loaded into typed columns.
#[derive(Debug, Clone)]
pub struct RockstarCatalog {
    pub header: RockstarHeader,
    /// Loaded columns in file order: `(tag, data)`.
    pub columns: Vec<(String, Column)>,
}

/// Column-tag mapping used to extract typed [`Halo`] records.
#[derive(Debug, Clone)]
pub struct HaloColumns {
    pub id: String,
    pub x: String,
    pub y: String,
    pub z: String,
    pub rvir: String,
    pub mass: String,
}

impl Default for HaloColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            x: "x".to_string(),
            y: "y".to_string(),
            z: "z".to_string(),
            rvir: "rvir".to_string(),
            mass: "mvir".to_string(),
        }
    }
}

impl HaloColumns {
    /// Same defaults with a different mass definition column.
    pub fn with_mass(mass: &str) -> Self {
        Self {
            mass: mass.to_string(),
            ..Self::default()
        }
    }
}

/// One halo record extracted from a catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Halo {
    pub id: i64,
    pub pos: [f64; 3],
    pub rvir: f64,
    pub mass: f64,
    /// Parent halo id; [`HALO_NOT_SET`] for host halos.
    pub pid: i64,
    /// Particle count, or [`HALO_NOT_SET`] when the column was not loaded.
    pub num_p: i64,
}

impl Halo {
    /// The sentinel row used for absent ids in id-indexed arrays.
    pub fn not_set() -> Self {
        Self {
            id: HALO_NOT_SET,
            pos: [0.0; 3],
            rvir: 0.0,
            mass: 0.0,
            pid: HALO_NOT_SET,
            num_p: HALO_NOT_SET,
        }
    }
}

impl RockstarCatalog {
    /// Loads a catalog, applying column selection and the host filter.
    ///
    /// # Errors
    /// Fails on truncated headers, rows whose width disagrees with the
    /// (patched) tag list, unparseable numbers, an empty column selection,
    /// or a host filter without a loaded PID column.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut header_lines = Vec::with_capacity(HEADER_ROWS);
        let mut data_lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if header_lines.len() < HEADER_ROWS {
                header_lines.push(line);
            } else if !line.trim().is_empty() {
                data_lines.push(line);
            }
        }

        let mut header = RockstarHeader::parse(&header_lines)?;
        if data_lines.is_empty() {
            return Err(RockstarError::NoDataRows);
        }

        let sample: Vec<&str> = data_lines[0].split_whitespace().collect();

        // Known upstream quirk: the tag line can declare one column more
        // than the rows carry. Truncate and append a synthetic PID tag.
        if header.column_tags.len() != sample.len() && !sample.is_empty() {
            header.column_tags.truncate(sample.len() - 1);
            header.column_tags.push("PID".to_string());
        }

        let mut selected: Vec<(usize, String, Column)> = Vec::new();
        for (i, tag) in header.column_tags.iter().enumerate() {
            if !options.selects(tag) {
                continue;
            }
            let token = sample.get(i).ok_or(RockstarError::RaggedRow {
                line: HEADER_ROWS,
                expected: header.column_tags.len(),
                got: sample.len(),
            })?;
            let column_type = sniff_type(token).ok_or_else(|| RockstarError::InvalidNumber {
                value: (*token).to_string(),
                line: HEADER_ROWS,
            })?;
            selected.push((i, tag.clone(), Column::with_type(column_type)));
        }

        if selected.is_empty() {
            return Err(RockstarError::EmptySelection);
        }

        let expected = header.column_tags.len();
        for (row, line) in data_lines.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let line_no = HEADER_ROWS + row;
            if tokens.len() != expected {
                return Err(RockstarError::RaggedRow {
                    line: line_no,
                    expected,
                    got: tokens.len(),
                });
            }
            for (i, _, column) in selected.iter_mut() {
                column.push_token(tokens[*i], line_no)?;
            }
        }

        let mut catalog = Self {
            header,
            columns: selected
                .into_iter()
                .map(|(_, tag, column)| (tag, column))
                .collect(),
        };

        if options.only_hosts {
            catalog.filter_hosts()?;
        }

        Ok(catalog)
    }

    /// Number of loaded halo rows.
    pub fn n_halos(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Tags of the loaded columns, in file order.
    pub fn included_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|(tag, _)| tag.as_str()).collect()
    }

    /// Looks up a loaded column by tag.
    pub fn column(&self, tag: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, c)| c)
    }

    /// A loaded column widened to f64.
    pub fn column_f64(&self, tag: &str) -> Result<Vec<f64>> {
        let column = self.column(tag).ok_or_else(|| RockstarError::MissingColumn {
            name: tag.to_string(),
        })?;
        Ok((0..column.len())
            .map(|i| column.get_f64(i).unwrap_or(f64::NAN))
            .collect())
    }

    /// Drops every row with `PID != -1`, keeping host halos only.
    fn filter_hosts(&mut self) -> Result<()> {
        let pid = self.column("PID").ok_or_else(|| RockstarError::MissingColumn {
            name: "PID".to_string(),
        })?;
        let keep: Vec<bool> = (0..pid.len())
            .map(|i| pid.get_i64(i) == Some(HALO_NOT_SET))
            .collect();
        for (_, column) in self.columns.iter_mut() {
            column.retain_mask(&keep);
        }
        Ok(())
    }

    /// Extracts typed halo records using the given column mapping.
    ///
    /// PID and `num_p` are optional; absent columns yield [`HALO_NOT_SET`].
    pub fn halos(&self, cols: &HaloColumns) -> Result<Vec<Halo>> {
        let required = |tag: &str| {
            self.column(tag).ok_or_else(|| RockstarError::MissingColumn {
                name: tag.to_string(),
            })
        };
        let id = required(&cols.id)?;
        let x = required(&cols.x)?;
        let y = required(&cols.y)?;
        let z = required(&cols.z)?;
        let rvir = required(&cols.rvir)?;
        let mass = required(&cols.mass)?;
        let pid = self.column("PID");
        let num_p = self.column("num_p");

        let n = self.n_halos();
        let mut halos = Vec::with_capacity(n);
        for i in 0..n {
            halos.push(Halo {
                id: id.get_i64(i).unwrap_or(HALO_NOT_SET),
                pos: [
                    x.get_f64(i).unwrap_or(f64::NAN),
                    y.get_f64(i).unwrap_or(f64::NAN),
                    z.get_f64(i).unwrap_or(f64::NAN),
                ],
                rvir: rvir.get_f64(i).unwrap_or(f64::NAN),
                mass: mass.get_f64(i).unwrap_or(f64::NAN),
                pid: pid.and_then(|c| c.get_i64(i)).unwrap_or(HALO_NOT_SET),
                num_p: num_p.and_then(|c| c.get_i64(i)).unwrap_or(HALO_NOT_SET),
            });
        }
        Ok(halos)
    }
}

/// Dense id-indexed halo array: slot `i` holds the halo with id `i`, or
/// [`Halo::not_set`] when that id is absent. Halo ids double as array
/// indices downstream (match files refer to halos by id).
pub fn index_by_id(halos: &[Halo]) -> Vec<Halo> {
    let highest = halos.iter().map(|h| h.id).max().unwrap_or(HALO_NOT_SET);
    if highest < 0 {
        return Vec::new();
    }

    let mut indexed = vec![Halo::not_set(); highest as usize + 1];
    for halo in halos {
        if halo.id >= 0 {
            indexed[halo.id as usize] = *halo;
        }
    }
    indexed
}

/// Partitions halos into mass bins. A halo lands in bin `i` when
/// `edges[i] < mass <= edges[i + 1]`; halos outside every bin are dropped.
pub fn bin_by_mass(halos: &[Halo], edges: &[f64]) -> Vec<Vec<Halo>> {
    let mut bins: Vec<Vec<Halo>> = vec![Vec::new(); edges.len().saturating_sub(1)];
    for halo in halos {
        for (i, pair) in edges.windows(2).enumerate() {
            if pair[0] < halo.mass && halo.mass <= pair[1] {
                bins[i].push(*halo);
                break;
            }
        }
    }
    bins
}

/// Scales positions in place (e.g. kpc/h → Mpc/h).
pub fn scale_positions(halos: &mut [Halo], factor: f64) {
    for halo in halos {
        for c in &mut halo.pos {
            *c *= factor;
        }
    }
}

/// Scales virial radii in place. Rockstar writes radii in kpc/h while
/// positions are in Mpc/h, so the two need separate factors.
pub fn scale_radii(halos: &mut [Halo], factor: f64) {
    for halo in halos {
        halo.rvir *= factor;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::super::header::sample_header_lines;
    use super::*;

    fn write_catalog_file(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in sample_header_lines() {
            writeln!(file, "{}", line).unwrap();
        }
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    // Columns: id num_p mvir mbound_vir rvir x y z PID
    const ROWS: &[&str] = &[
        "0 5000 1.0e12 9.5e11 250.0 10.0 20.0 30.0 -1",
        "1 300 2.0e11 1.8e11 120.0 40.0 50.0 60.0 0",
        "3 800 5.0e11 4.9e11 180.0 70.0 80.0 90.0 -1",
    ];

    #[test]
    fn test_type_inference_int_and_float() {
        let file = write_catalog_file(ROWS);
        let catalog = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap();

        assert_eq!(catalog.column("id").unwrap().column_type(), ColumnType::Int);
        assert_eq!(
            catalog.column("mvir").unwrap().column_type(),
            ColumnType::Float
        );
        assert_eq!(
            catalog.column("PID").unwrap().column_type(),
            ColumnType::Int
        );
    }

    #[test]
    fn test_load_all_columns() {
        let file = write_catalog_file(ROWS);
        let catalog = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap();

        assert_eq!(catalog.n_halos(), 3);
        assert_eq!(catalog.included_columns().len(), 9);
        assert_eq!(catalog.column("x").unwrap().get_f64(1), Some(40.0));
        assert_eq!(catalog.column("id").unwrap().get_i64(2), Some(3));
    }

    #[test]
    fn test_only_filter() {
        let file = write_catalog_file(ROWS);
        let options = LoadOptions {
            only: vec!["id".to_string(), "mvir".to_string()],
            ..Default::default()
        };
        let catalog = RockstarCatalog::load(file.path(), &options).unwrap();
        assert_eq!(catalog.included_columns(), vec!["id", "mvir"]);
    }

    #[test]
    fn test_exclude_filter() {
        let file = write_catalog_file(ROWS);
        let options = LoadOptions {
            exclude: vec!["num_p".to_string()],
            ..Default::default()
        };
        let catalog = RockstarCatalog::load(file.path(), &options).unwrap();
        assert!(catalog.column("num_p").is_none());
        assert_eq!(catalog.included_columns().len(), 8);
    }

    #[test]
    fn test_empty_selection_is_error() {
        let file = write_catalog_file(ROWS);
        let options = LoadOptions {
            only: vec!["no_such_column".to_string()],
            ..Default::default()
        };
        let err = RockstarCatalog::load(file.path(), &options).unwrap_err();
        assert!(matches!(err, RockstarError::EmptySelection));
    }

    #[test]
    fn test_host_filter_drops_subhalos() {
        let file = write_catalog_file(ROWS);
        let options = LoadOptions {
            only_hosts: true,
            ..Default::default()
        };
        let catalog = RockstarCatalog::load(file.path(), &options).unwrap();

        assert_eq!(catalog.n_halos(), 2);
        let pid = catalog.column("PID").unwrap();
        for i in 0..catalog.n_halos() {
            assert_eq!(pid.get_i64(i), Some(HALO_NOT_SET));
        }
    }

    #[test]
    fn test_host_filter_requires_pid() {
        let file = write_catalog_file(ROWS);
        let options = LoadOptions {
            only: vec!["id".to_string(), "mvir".to_string()],
            only_hosts: true,
            ..Default::default()
        };
        let err = RockstarCatalog::load(file.path(), &options).unwrap_err();
        assert!(matches!(err, RockstarError::MissingColumn { .. }));
    }

    #[test]
    fn test_pid_column_patch() {
        // Header declares 10 tags, rows carry 9 tokens: the tag list gets
        // truncated to 8 and a synthetic PID tag appended.
        let mut lines = sample_header_lines();
        lines[0] = "#id num_p mvir mbound_vir rvir x y z extra_tag ghost".to_string();

        let mut file = NamedTempFile::new().unwrap();
        for line in &lines {
            writeln!(file, "{}", line).unwrap();
        }
        for row in ROWS {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();

        let catalog = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap();
        let tags = catalog.included_columns();
        assert_eq!(tags.len(), 9);
        assert_eq!(*tags.last().unwrap(), "PID");
        assert_eq!(catalog.column("PID").unwrap().get_i64(1), Some(0));
    }

    #[test]
    fn test_ragged_row_is_error() {
        let file = write_catalog_file(&[ROWS[0], "1 2 3"]);
        let err = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, RockstarError::RaggedRow { .. }));
    }

    #[test]
    fn test_no_data_rows() {
        let file = write_catalog_file(&[]);
        let err = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, RockstarError::NoDataRows));
    }

    #[test]
    fn test_halos_extraction() {
        let file = write_catalog_file(ROWS);
        let catalog = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap();
        let halos = catalog.halos(&HaloColumns::default()).unwrap();

        assert_eq!(halos.len(), 3);
        assert_eq!(halos[0].id, 0);
        assert_eq!(halos[0].pos, [10.0, 20.0, 30.0]);
        assert_eq!(halos[0].mass, 1.0e12);
        assert_eq!(halos[1].pid, 0);
        assert_eq!(halos[2].num_p, 800);
    }

    #[test]
    fn test_halos_with_mass_column() {
        let file = write_catalog_file(ROWS);
        let catalog = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap();
        let halos = catalog.halos(&HaloColumns::with_mass("mbound_vir")).unwrap();
        assert_eq!(halos[0].mass, 9.5e11);
    }

    #[test]
    fn test_index_by_id_sentinels() {
        let file = write_catalog_file(ROWS);
        let catalog = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap();
        let halos = catalog.halos(&HaloColumns::default()).unwrap();
        let indexed = index_by_id(&halos);

        // ids 0, 1, 3 present; id 2 absent.
        assert_eq!(indexed.len(), 4);
        assert_eq!(indexed[0].id, 0);
        assert_eq!(indexed[1].id, 1);
        assert_eq!(indexed[2].id, HALO_NOT_SET);
        assert_eq!(indexed[3].id, 3);
    }

    #[test]
    fn test_bin_by_mass() {
        let file = write_catalog_file(ROWS);
        let catalog = RockstarCatalog::load(file.path(), &LoadOptions::default()).unwrap();
        let halos = catalog.halos(&HaloColumns::default()).unwrap();

        let edges = [1.0e11, 1.0e12, 1.0e13];
        let bins = bin_by_mass(&halos, &edges);
        assert_eq!(bins.len(), 2);
        // 2e11 and 5e11 in the first bin, 1e12 on the inclusive upper edge.
        assert_eq!(bins[0].len(), 3);
        assert_eq!(bins[1].len(), 0);
    }

    #[test]
    fn test_scaling_helpers() {
        let mut halos = vec![Halo {
            id: 0,
            pos: [1.0, 2.0, 3.0],
            rvir: 250.0,
            mass: 1.0e12,
            pid: HALO_NOT_SET,
            num_p: 100,
        }];
        scale_positions(&mut halos, 2.0);
        scale_radii(&mut halos, 1e-3);
        assert_eq!(halos[0].pos, [2.0, 4.0, 6.0]);
        assert_eq!(halos[0].rvir, 0.25);
    }
}
