//! File-level tables: objects, layers, materials, groups.

use crate::geometry::Geometry;

/// An 8-bit RGBA color as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque in color fields; layer/material
    /// transparency is carried separately).
    pub a: u8,
}

impl Color {
    /// Create from channels.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Channels as an array `[r, g, b, a]`.
    pub fn channels(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A layer descriptor from the layer table.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Display color.
    pub color: Color,
    /// Plot (print) color.
    pub plot_color: Color,
    /// Index into the material table; values below 1 or out of range mean
    /// "no material".
    pub material_index: i32,
    /// Layer visibility flag.
    pub visible: bool,
}

/// A material descriptor from the material table.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// Ambient color.
    pub ambient: Color,
    /// Diffuse color.
    pub diffuse: Color,
    /// Emissive color.
    pub emissive: Color,
    /// Specular color.
    pub specular: Color,
    /// Shininess, 0–255 in the source format.
    pub shine: f64,
    /// Transparency fraction in `[0, 1]`; 0 is opaque.
    pub transparency: f64,
}

/// A group descriptor. Groups are enumerated but otherwise opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group index.
    pub index: i32,
    /// Group name.
    pub name: String,
}

/// Per-object attributes from the object table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectAttributes {
    /// Object name, possibly empty.
    pub name: String,
    /// Index into the layer table.
    pub layer_index: usize,
}

/// One entry of the object table: geometry plus attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelObject {
    /// The geometry payload.
    pub geometry: Geometry,
    /// Attributes (name, layer).
    pub attributes: ObjectAttributes,
}

/// A parsed .3dm file: the object table plus the layer, material, and
/// group tables. Produced by the container reader, consumed read-only by
/// the import pipeline.
#[derive(Debug, Clone, Default)]
pub struct File3dm {
    /// Geometry objects in file order.
    pub objects: Vec<ModelObject>,
    /// Layer table.
    pub layers: Vec<Layer>,
    /// Material table.
    pub materials: Vec<Material>,
    /// Group table.
    pub groups: Vec<Group>,
}

impl File3dm {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the material referenced by a layer, if the reference is
    /// valid (index at least 1 and in range).
    pub fn layer_material(&self, layer: &Layer) -> Option<&Material> {
        if layer.material_index < 1 {
            return None;
        }
        self.materials.get(layer.material_index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(material_index: i32) -> Layer {
        Layer {
            name: "test".into(),
            color: Color::new(200, 10, 10, 255),
            plot_color: Color::BLACK,
            material_index,
            visible: true,
        }
    }

    fn material(name: &str) -> Material {
        Material {
            name: name.into(),
            ambient: Color::BLACK,
            diffuse: Color::new(0, 128, 255, 255),
            emissive: Color::BLACK,
            specular: Color::WHITE,
            shine: 50.0,
            transparency: 0.25,
        }
    }

    #[test]
    fn test_layer_material_lookup() {
        let mut file = File3dm::new();
        file.materials = vec![material("default"), material("red")];

        // Index 0 means "no material" in the source convention.
        assert!(file.layer_material(&layer(0)).is_none());
        assert!(file.layer_material(&layer(-1)).is_none());
        assert_eq!(file.layer_material(&layer(1)).map(|m| m.name.as_str()), Some("red"));
        assert!(file.layer_material(&layer(7)).is_none());
    }
}
