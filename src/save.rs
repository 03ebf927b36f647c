use crate::Axis;
use crate::Error;
use crate::LOG_FLOOR_DROP;
use crate::Weight;
use byteorder::LittleEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

/// Output encoding for a serialized grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One line per bin: tab-separated bin centers, then the value.
    Ascii,
    /// Fixed-width little-endian header records followed by the flat cells.
    Binary,
}

/// Value transform applied while serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Raw bin values, no transform.
    Linear,
    /// Natural log of each bin; empty bins get the log-floor sentinel,
    /// `ln(min nonzero bin) - LOG_FLOOR_DROP`, in place of `ln(0)`.
    LogDensity,
}

/// Serializes one grid to a file. Shared by both accumulators: `axes`
/// describes the geometry, `cells` is the flat snapshot of bin values in
/// the grid's native linear order (last axis contiguous).
pub(crate) fn write_grid(
    path: &Path,
    axes: &[Axis],
    cells: &[Weight],
    encoding: Encoding,
    scale: Scale,
) -> Result<(), Error> {
    let ref mut file = BufWriter::new(std::fs::File::create(path)?);
    match encoding {
        Encoding::Ascii => write_ascii(file, axes, cells, scale)?,
        Encoding::Binary => write_binary(file, axes, cells, scale)?,
    }
    Ok(file.flush()?)
}

fn write_ascii<W>(w: &mut W, axes: &[Axis], cells: &[Weight], scale: Scale) -> Result<(), Error>
where
    W: Write,
{
    let view = View::new(cells, scale);
    for (linear, cell) in cells.iter().enumerate() {
        for (axis, i) in axes.iter().zip(coords(axes, linear)) {
            write!(w, "{}\t", axis.center(i))?;
        }
        writeln!(w, "{}", view.apply(*cell))?;
    }
    Ok(())
}

fn write_binary<W>(w: &mut W, axes: &[Axis], cells: &[Weight], scale: Scale) -> Result<(), Error>
where
    W: Write,
{
    let view = View::new(cells, scale);
    for axis in axes {
        w.write_u32::<LittleEndian>(axes.len() as u32)?;
        w.write_u32::<LittleEndian>(axis.bins() as u32)?;
        w.write_f64::<LittleEndian>(axis.lower())?;
        w.write_f64::<LittleEndian>(axis.upper())?;
        w.write_f64::<LittleEndian>(axis.width())?;
    }
    for cell in cells {
        w.write_f64::<LittleEndian>(view.apply(*cell))?;
    }
    Ok(())
}

/// Reads back the per-axis header records of a binary grid file.
///
/// Validates that every record repeats the same dimension count and that
/// each recorded bin width matches the width recomputed from its bounds.
pub fn read_header<R>(r: &mut R) -> Result<Vec<Axis>, Error>
where
    R: Read,
{
    let n = r.read_u32::<LittleEndian>()?;
    if n == 0 {
        return Err(Error::Format("zero-dimensional header".to_string()));
    }
    let mut axes = Vec::with_capacity(n as usize);
    for i in 0..n {
        let repeat = match i {
            0 => n,
            _ => r.read_u32::<LittleEndian>()?,
        };
        if repeat != n {
            return Err(Error::Format(format!(
                "dimension count changed from {} to {} at axis {}",
                n, repeat, i
            )));
        }
        let bins = r.read_u32::<LittleEndian>()? as usize;
        let lower = r.read_f64::<LittleEndian>()?;
        let upper = r.read_f64::<LittleEndian>()?;
        let width = r.read_f64::<LittleEndian>()?;
        let axis = Axis::new(lower, upper, bins)?;
        if axis.width().to_bits() != width.to_bits() {
            return Err(Error::Format(format!(
                "recorded width {} disagrees with geometry of axis {}",
                width, i
            )));
        }
        axes.push(axis);
    }
    Ok(axes)
}

/// Reads a whole binary grid file: header records, then every cell.
pub fn read_binary(path: impl AsRef<Path>) -> Result<(Vec<Axis>, Vec<Weight>), Error> {
    let ref mut file = std::io::BufReader::new(std::fs::File::open(path)?);
    let axes = read_header(file)?;
    let cells = (0..axes.iter().map(Axis::bins).product::<usize>())
        .map(|_| file.read_f64::<LittleEndian>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok((axes, cells))
}

/// Recovers the multi-index of a linear cell position from axis extents.
fn coords(axes: &[Axis], linear: usize) -> Vec<usize> {
    let mut index = vec![0; axes.len()];
    let mut rest = linear;
    for (i, axis) in axes.iter().enumerate().rev() {
        index[i] = rest % axis.bins();
        rest /= axis.bins();
    }
    index
}

/// The per-cell value transform for one serialization pass.
///
/// For log output the floor is derived from a single scan for the minimum
/// strictly positive cell; a grid with no mass at all leaves the floor at
/// `ln(+inf) - LOG_FLOOR_DROP = +inf`, matching the raw sentinel
/// arithmetic rather than guessing a finite stand-in.
enum View {
    Raw,
    Log { floor: Weight },
}

impl View {
    fn new(cells: &[Weight], scale: Scale) -> Self {
        match scale {
            Scale::Linear => View::Raw,
            Scale::LogDensity => View::Log {
                floor: cells
                    .iter()
                    .copied()
                    .filter(|&v| v > 0.)
                    .fold(Weight::INFINITY, Weight::min)
                    .ln()
                    - LOG_FLOOR_DROP,
            },
        }
    }
    fn apply(&self, value: Weight) -> Weight {
        match self {
            View::Raw => value,
            View::Log { floor } => {
                if value == 0. {
                    *floor
                } else {
                    value.ln()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes_1d() -> Vec<Axis> {
        vec![Axis::new(0., 4., 4).expect("axis")]
    }

    #[test]
    fn log_floor_sentinel_replaces_empty_bins() {
        let cells = [0., 0., 3.0, 0.];
        let mut buffer = Vec::new();
        write_ascii(&mut buffer, &axes_1d(), &cells, Scale::LogDensity).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        let values = text
            .lines()
            .map(|line| line.rsplit('\t').next().expect("value column"))
            .map(|v| v.parse::<f64>().expect("parse"))
            .collect::<Vec<_>>();
        let floor = 3.0f64.ln() - LOG_FLOOR_DROP;
        assert!((values[0] - floor).abs() < 1e-12);
        assert!((values[1] - floor).abs() < 1e-12);
        assert!((values[2] - 3.0f64.ln()).abs() < 1e-12);
        assert!((values[3] - floor).abs() < 1e-12);
    }

    #[test]
    fn linear_scale_writes_raw_values() {
        let cells = [0., 2.5, 0., 1.];
        let mut buffer = Vec::new();
        write_ascii(&mut buffer, &axes_1d(), &cells, Scale::Linear).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0.5\t0");
        assert_eq!(lines[1], "1.5\t2.5");
        assert_eq!(lines[3], "3.5\t1");
    }

    #[test]
    fn ascii_lines_carry_one_center_per_axis() {
        let axes = vec![
            Axis::new(0., 2., 2).expect("axis"),
            Axis::new(0., 3., 3).expect("axis"),
        ];
        let cells = vec![1.; 6];
        let mut buffer = Vec::new();
        write_ascii(&mut buffer, &axes, &cells, Scale::Linear).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().all(|l| l.split('\t').count() == 3));
        assert!(text.lines().next().expect("first").starts_with("0.5\t0.5\t"));
    }

    #[test]
    fn binary_header_round_trips_exactly() {
        let axes = vec![
            Axis::new(-3., 3., 12).expect("axis"),
            Axis::new(0., 1., 7).expect("axis"),
            Axis::new(2., 8., 3).expect("axis"),
        ];
        let cells = vec![0.; 12 * 7 * 3];
        let mut buffer = Vec::new();
        write_binary(&mut buffer, &axes, &cells, Scale::Linear).expect("write");
        let restored = read_header(&mut buffer.as_slice()).expect("read");
        assert_eq!(restored, axes);
    }

    #[test]
    fn binary_cells_round_trip_in_linear_order() {
        let axes = vec![Axis::new(0., 1., 4).expect("axis")];
        let cells = vec![0.25, 0., 1.5, 8.];
        let mut buffer = Vec::new();
        write_binary(&mut buffer, &axes, &cells, Scale::Linear).expect("write");
        let ref mut reader = buffer.as_slice();
        let restored = read_header(reader).expect("header");
        assert_eq!(restored.len(), 1);
        let values = (0..4)
            .map(|_| reader.read_f64::<LittleEndian>().expect("cell"))
            .collect::<Vec<_>>();
        assert_eq!(values, cells);
    }

    #[test]
    fn corrupt_dimension_count_is_rejected() {
        let mut buffer = Vec::new();
        buffer.write_u32::<LittleEndian>(2).expect("n");
        buffer.write_u32::<LittleEndian>(4).expect("bins");
        buffer.write_f64::<LittleEndian>(0.).expect("lower");
        buffer.write_f64::<LittleEndian>(1.).expect("upper");
        buffer.write_f64::<LittleEndian>(0.25).expect("width");
        buffer.write_u32::<LittleEndian>(3).expect("wrong n");
        buffer.write_u32::<LittleEndian>(4).expect("bins");
        buffer.write_f64::<LittleEndian>(0.).expect("lower");
        buffer.write_f64::<LittleEndian>(1.).expect("upper");
        buffer.write_f64::<LittleEndian>(0.25).expect("width");
        assert!(matches!(
            read_header(&mut buffer.as_slice()),
            Err(Error::Format(_))
        ));
    }
}
