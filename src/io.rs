//! Export of chunks to legacy VTK files.

use std::path::{Path, PathBuf};

use log::info;
use vtkio::{
    model::{
        Attribute, Attributes, ByteOrder, DataArrayBase, DataSet, ElementType, Extent, Piece,
        StructuredGridPiece,
    },
    IOBuffer, Vtk,
};

use crate::{
    error::ExportError,
    grid::{ArrayData, Dataset, StructuredGrid},
    partition::MeshPartition,
};

fn point_attribute(name: &str, data: &ArrayData) -> Attribute {
    let data = match data {
        ArrayData::UnsignedChar(values) => IOBuffer::new(values.to_vec()),
        ArrayData::Double(values) => IOBuffer::new(values.to_vec()),
    };

    Attribute::DataArray(DataArrayBase {
        name: name.to_string(),
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data,
    })
}

/// Build the VTK model of a structured grid with all its point arrays.
pub fn structured_grid_model(grid: &StructuredGrid, title: &str) -> Vtk {
    let [nx, ny, nz] = grid.dimensions();
    let extent = Extent::Dims([nx as u32, ny as u32, nz as u32]);

    let piece = StructuredGridPiece {
        extent: extent.clone(),
        points: IOBuffer::new(grid.points().to_vec()),
        data: Attributes {
            point: grid
                .point_data()
                .iter()
                .map(|array| point_attribute(&array.name, &array.data))
                .collect(),
            cell: Vec::new(),
        },
    };

    Vtk {
        version: (2, 2).into(),
        title: title.to_string(),
        byte_order: ByteOrder::LittleEndian,
        data: DataSet::StructuredGrid {
            extent,
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        },
        file_path: None,
    }
}

/// Write every present structured chunk to `<directory>/<prefix>_<domain>.vtk`.
///
/// Absent domains and non structured datasets are skipped. Returns the paths
/// of the written files.
pub fn export_to_vtk<P: MeshPartition>(
    partition: &P,
    directory: impl AsRef<Path>,
    prefix: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    let directory = directory.as_ref();
    std::fs::create_dir_all(directory)?;

    let mut written = Vec::new();

    for domain in 0..partition.num_domains() {
        let Some(grid) = partition.dataset(domain).and_then(Dataset::as_structured) else {
            continue;
        };

        let path = directory.join(format!("{}_{}.vtk", prefix, domain));
        let model = structured_grid_model(grid, &format!("{} domain {}", prefix, domain));

        model.export(&path).map_err(|e| match e {
            vtkio::Error::IO(io) => ExportError::Io(io),
            other => ExportError::Vtk(format!("{:?}", other)),
        })?;

        written.push(path);
    }

    info!(
        "Exported {} chunks to {}",
        written.len(),
        directory.display()
    );

    Ok(written)
}

/// Read the node dimensions back from a legacy VTK file written by [export_to_vtk].
pub fn read_dimensions(path: impl AsRef<Path>) -> Result<[usize; 3], ExportError> {
    let model = Vtk::import(path.as_ref()).map_err(|e| match e {
        vtkio::Error::IO(io) => ExportError::Io(io),
        other => ExportError::Vtk(format!("{:?}", other)),
    })?;

    match model.data {
        DataSet::StructuredGrid { pieces, .. } => match pieces.first() {
            Some(Piece::Inline(piece)) => match piece.extent {
                Extent::Dims([nx, ny, nz]) => Ok([nx as usize, ny as usize, nz as usize]),
                _ => Err(ExportError::Vtk("unexpected extent".to_string())),
            },
            _ => Err(ExportError::Vtk("missing inline piece".to_string())),
        },
        _ => Err(ExportError::Vtk("not a structured grid".to_string())),
    }
}
