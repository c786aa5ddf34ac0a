//! Document assembly: layer styling, the per-object import loop with
//! error isolation, and the diagnostic report.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use threedm_model::{File3dm, Layer, Material};

use crate::dispatch::{translate_geometry, DocEntity};
use crate::error::{ImportError, TranslateError};
use crate::translate::{color_and_opacity, color_to_unit};

/// Display style computed for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    /// Line color as unit RGBA.
    pub line_color: [f64; 4],
    /// Fill color as unit RGB.
    pub fill_color: [f64; 3],
    /// Opacity percentage, 0 (opaque) to 100 (fully transparent).
    pub opacity_percent: u8,
}

/// Compute a layer's display style.
///
/// A layer with a valid material reference takes its fill from the
/// material diffuse color and its opacity from the material transparency;
/// the line color is cleared. Otherwise the plot color drives lines and
/// the layer's own color drives fill. A pure-black fill is substituted
/// with white so geometry stays visible on dark backgrounds.
pub fn layer_style(file: &File3dm, layer: &Layer) -> Result<LayerStyle, TranslateError> {
    let (mut fill, line, opacity) = match file.layer_material(layer) {
        Some(material) => {
            let (fill, _) = color_and_opacity(&material.diffuse.channels())?;
            let opacity = (material.transparency * 100.0).round() as u8;
            (fill, [0.0; 4], opacity)
        }
        None => {
            let line = color_to_unit(&layer.plot_color.channels())?;
            let (fill, opacity) = color_and_opacity(&layer.color.channels())?;
            (fill, line, opacity)
        }
    };
    if fill == [0.0, 0.0, 0.0] {
        fill = [1.0, 1.0, 1.0];
    }
    Ok(LayerStyle {
        line_color: line,
        fill_color: fill,
        opacity_percent: opacity,
    })
}

/// A material converted to unit-float channels for the document's render
/// settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialStyle {
    /// Material name.
    pub name: String,
    /// Ambient color, unit RGBA.
    pub ambient: [f64; 4],
    /// Diffuse color, unit RGBA.
    pub diffuse: [f64; 4],
    /// Emissive color, unit RGBA.
    pub emissive: [f64; 4],
    /// Specular color, unit RGBA.
    pub specular: [f64; 4],
    /// Shininess, copied through.
    pub shine: f64,
    /// Transparency fraction, copied through.
    pub transparency: f64,
}

/// Convert a material table entry to unit-float channels.
pub fn material_style(material: &Material) -> Result<MaterialStyle, TranslateError> {
    Ok(MaterialStyle {
        name: material.name.clone(),
        ambient: color_to_unit(&material.ambient.channels())?,
        diffuse: color_to_unit(&material.diffuse.channels())?,
        emissive: color_to_unit(&material.emissive.channels())?,
        specular: color_to_unit(&material.specular.channels())?,
        shine: material.shine,
        transparency: material.transparency,
    })
}

/// One output layer: style plus the entities grouped under it.
#[derive(Debug, Clone)]
pub struct ImportedLayer {
    /// Layer name from the file.
    pub name: String,
    /// Visibility flag from the file.
    pub visible: bool,
    /// Computed display style.
    pub style: LayerStyle,
    /// Entities whose source object referenced this layer.
    pub entities: Vec<DocEntity>,
}

/// The assembled output document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Layers in table order.
    pub layers: Vec<ImportedLayer>,
    /// Converted materials in table order.
    pub materials: Vec<MaterialStyle>,
    /// Entities whose layer index was out of range.
    pub unlayered: Vec<DocEntity>,
}

impl Document {
    /// Total number of entities across all layers.
    pub fn num_entities(&self) -> usize {
        self.layers.iter().map(|l| l.entities.len()).sum::<usize>() + self.unlayered.len()
    }
}

/// One recorded per-object failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Index into the file's object table.
    pub object_index: usize,
    /// Human-readable failure description.
    pub message: String,
}

/// Summary of an import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Number of objects processed.
    pub attempted: usize,
    /// Number of objects that produced an entity.
    pub succeeded: usize,
    /// Per-object failures, in object order.
    pub failures: Vec<ImportFailure>,
}

/// Import a parsed file into a document, translating objects one by one.
///
/// A failed object is recorded in the report and skipped; it never aborts
/// the rest of the file. Only a malformed layer table fails the whole
/// import.
pub fn import_model(file: &File3dm) -> Result<(Document, ImportReport), ImportError> {
    let results = file
        .objects
        .iter()
        .map(|object| translate_geometry(&object.geometry))
        .collect();
    assemble(file, results)
}

/// Parallel variant of [`import_model`]. Object translations are
/// independent, so they run on the rayon pool; layer-group placement
/// happens afterwards, in object order, outside the parallel region.
pub fn import_model_parallel(file: &File3dm) -> Result<(Document, ImportReport), ImportError> {
    let results = file
        .objects
        .par_iter()
        .map(|object| translate_geometry(&object.geometry))
        .collect();
    assemble(file, results)
}

fn assemble(
    file: &File3dm,
    results: Vec<Result<Option<DocEntity>, TranslateError>>,
) -> Result<(Document, ImportReport), ImportError> {
    let mut layers = Vec::with_capacity(file.layers.len());
    for (index, layer) in file.layers.iter().enumerate() {
        let style = layer_style(file, layer).map_err(|e| ImportError::layer(index, e))?;
        layers.push(ImportedLayer {
            name: layer.name.clone(),
            visible: layer.visible,
            style,
            entities: Vec::new(),
        });
    }

    let mut materials = Vec::with_capacity(file.materials.len());
    for (index, material) in file.materials.iter().enumerate() {
        materials.push(material_style(material).map_err(|e| ImportError::material(index, e))?);
    }

    let mut document = Document {
        layers,
        materials,
        unlayered: Vec::new(),
    };
    let mut report = ImportReport::default();

    for (index, result) in results.into_iter().enumerate() {
        report.attempted += 1;
        match result {
            Ok(Some(entity)) => {
                report.succeeded += 1;
                let layer_index = file.objects[index].attributes.layer_index;
                match document.layers.get_mut(layer_index) {
                    Some(layer) => layer.entities.push(entity),
                    None => document.unlayered.push(entity),
                }
            }
            Ok(None) => {}
            Err(source) => {
                let error = ImportError::object(index, source);
                report.failures.push(ImportFailure {
                    object_index: index,
                    message: error.to_string(),
                });
            }
        }
    }

    Ok((document, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use threedm_math::Point3;
    use threedm_model::{
        Color, Curve, Geometry, Layer, LineData, Material, ModelObject, NurbsCurveData,
        ObjectAttributes, Point4,
    };

    fn line_object(layer_index: usize) -> ModelObject {
        ModelObject {
            geometry: Geometry::Curve(Curve::Line(LineData {
                from: Point3::origin(),
                to: Point3::new(1.0, 0.0, 0.0),
            })),
            attributes: ObjectAttributes {
                name: String::new(),
                layer_index,
            },
        }
    }

    fn bad_curve_object(layer_index: usize) -> ModelObject {
        // Zero weight on the second pole.
        ModelObject {
            geometry: Geometry::Curve(Curve::Nurbs(NurbsCurveData {
                degree: 1,
                points: vec![
                    Point4::new(0.0, 0.0, 0.0, 1.0),
                    Point4::new(1.0, 0.0, 0.0, 0.0),
                ],
                knots: vec![0.0, 1.0],
            })),
            attributes: ObjectAttributes {
                name: String::new(),
                layer_index,
            },
        }
    }

    fn plain_layer(name: &str) -> Layer {
        Layer {
            name: name.into(),
            color: Color::new(200, 40, 40, 255),
            plot_color: Color::new(10, 10, 10, 255),
            material_index: 0,
            visible: true,
        }
    }

    fn test_material() -> Material {
        Material {
            name: "steel".into(),
            ambient: Color::BLACK,
            diffuse: Color::new(51, 102, 204, 255),
            emissive: Color::BLACK,
            specular: Color::WHITE,
            shine: 100.0,
            transparency: 0.25,
        }
    }

    #[test]
    fn test_error_isolation() {
        let mut file = File3dm::new();
        file.layers = vec![plain_layer("default")];
        file.objects = vec![
            line_object(0),
            bad_curve_object(0),
            line_object(0),
            ModelObject {
                geometry: Geometry::Box,
                attributes: ObjectAttributes::default(),
            },
        ];

        let (document, report) = import_model(&file).unwrap();
        assert_eq!(report.attempted, 4);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].object_index, 1);
        assert!(report.failures[0].message.contains("object 1"));
        assert_eq!(document.layers[0].entities.len(), 2);
    }

    #[test]
    fn test_out_of_range_layer_goes_unlayered() {
        let mut file = File3dm::new();
        file.layers = vec![plain_layer("only")];
        file.objects = vec![line_object(0), line_object(7)];

        let (document, report) = import_model(&file).unwrap();
        assert_eq!(report.succeeded, 2);
        assert_eq!(document.layers[0].entities.len(), 1);
        assert_eq!(document.unlayered.len(), 1);
    }

    #[test]
    fn test_layer_style_material_path() {
        let mut file = File3dm::new();
        file.materials = vec![test_material(), test_material()];
        let mut layer = plain_layer("styled");
        layer.material_index = 1;

        let style = layer_style(&file, &layer).unwrap();
        assert_eq!(style.line_color, [0.0; 4]);
        assert!((style.fill_color[0] - 51.0 / 255.0).abs() < 1e-12);
        assert!((style.fill_color[2] - 204.0 / 255.0).abs() < 1e-12);
        assert_eq!(style.opacity_percent, 25);
    }

    #[test]
    fn test_layer_style_fallback_path() {
        let file = File3dm::new();
        let layer = plain_layer("plain");

        let style = layer_style(&file, &layer).unwrap();
        // Plot color drives lines, layer color drives fill.
        assert!((style.line_color[0] - 10.0 / 255.0).abs() < 1e-12);
        assert!((style.fill_color[0] - 200.0 / 255.0).abs() < 1e-12);
        assert_eq!(style.opacity_percent, 0);
    }

    #[test]
    fn test_material_style_conversion() {
        let style = material_style(&test_material()).unwrap();
        assert_eq!(style.name, "steel");
        assert!((style.diffuse[1] - 102.0 / 255.0).abs() < 1e-12);
        assert_eq!(style.specular, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(style.shine, 100.0);
        assert_eq!(style.transparency, 0.25);
    }

    #[test]
    fn test_document_carries_materials() {
        let mut file = File3dm::new();
        file.materials = vec![test_material()];
        let (document, _) = import_model(&file).unwrap();
        assert_eq!(document.materials.len(), 1);
        assert_eq!(document.materials[0].name, "steel");
    }

    #[test]
    fn test_layer_style_black_fill_becomes_white() {
        let file = File3dm::new();
        let mut layer = plain_layer("dark");
        layer.color = Color::BLACK;

        let style = layer_style(&file, &layer).unwrap();
        assert_eq!(style.fill_color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut file = File3dm::new();
        file.layers = vec![plain_layer("a"), plain_layer("b")];
        file.objects = vec![
            line_object(0),
            line_object(1),
            bad_curve_object(0),
            line_object(1),
        ];

        let (doc_seq, rep_seq) = import_model(&file).unwrap();
        let (doc_par, rep_par) = import_model_parallel(&file).unwrap();
        assert_eq!(rep_seq.attempted, rep_par.attempted);
        assert_eq!(rep_seq.succeeded, rep_par.succeeded);
        assert_eq!(rep_seq.failures.len(), rep_par.failures.len());
        assert_eq!(rep_seq.failures[0].object_index, rep_par.failures[0].object_index);
        assert_eq!(doc_seq.num_entities(), doc_par.num_entities());
        assert_eq!(doc_seq.layers[1].entities.len(), doc_par.layers[1].entities.len());
    }

    #[test]
    fn test_report_serializes() {
        let report = ImportReport {
            attempted: 3,
            succeeded: 2,
            failures: vec![ImportFailure {
                object_index: 1,
                message: "object 1: degenerate control point weight (w = 0)".into(),
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"attempted\":3"));
        let back: ImportReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.failures.len(), 1);
    }
}
