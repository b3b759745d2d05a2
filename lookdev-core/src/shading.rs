//! Principled shader parameter sets for the backdrop and the reference kit.

use serde::{Deserialize, Serialize};

use crate::plan::NodeSpec;
use crate::scene::ParamValue;

pub const SHADER_NODE_TYPE: &str = "principledshader";
/// Parameter a material assignment node reads its shader path from.
pub const MATERIAL_PATH_PARAM: &str = "shop_materialpath1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipledShader {
    /// Left at the host default when `None`.
    #[serde(default)]
    pub base_color: Option<[f64; 3]>,
    pub roughness: f64,
    #[serde(default)]
    pub metallic: Option<f64>,
    /// Albedo texture; `base_color` then acts as its tint.
    #[serde(default)]
    pub base_color_texture: Option<String>,
}

impl PrincipledShader {
    pub fn diffuse(albedo: f64, roughness: f64) -> Self {
        Self {
            base_color: Some([albedo; 3]),
            roughness,
            metallic: None,
            base_color_texture: None,
        }
    }

    pub fn metal(roughness: f64) -> Self {
        Self {
            base_color: None,
            roughness,
            metallic: Some(1.0),
            base_color_texture: None,
        }
    }

    pub fn textured(texture: impl Into<String>, roughness: f64) -> Self {
        Self {
            base_color: Some([1.0; 3]),
            roughness,
            metallic: None,
            base_color_texture: Some(texture.into()),
        }
    }

    pub fn to_spec(&self, path: impl Into<String>) -> NodeSpec {
        let mut spec = NodeSpec::new(path, SHADER_NODE_TYPE);
        if let Some(color) = self.base_color {
            spec = spec.param("basecolor", ParamValue::Tuple(color.to_vec()));
        }
        spec = spec.param("rough", self.roughness);
        if let Some(metallic) = self.metallic {
            spec = spec.param("metallic", metallic);
        }
        if let Some(texture) = &self.base_color_texture {
            spec = spec
                .param("basecolor_useTexture", true)
                .param("basecolor_texture", texture.as_str());
        }
        spec
    }
}

/// Material assignment node wiring `input` to the shader at `shader_path`.
pub fn material_spec(path: impl Into<String>, input: &str, shader_path: &str) -> NodeSpec {
    NodeSpec::new(path, "material")
        .input(0, input)
        .param(MATERIAL_PATH_PARAM, shader_path)
        .after(shader_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textured_shader_sets_texture_params() {
        let spec = PrincipledShader::textured("/tex/chart.png", 1.0).to_spec("/obj/m/s");
        assert_eq!(
            spec.get_param("basecolor_useTexture"),
            Some(&ParamValue::Bool(true))
        );
        assert_eq!(
            spec.get_param("basecolor_texture").and_then(ParamValue::as_str),
            Some("/tex/chart.png")
        );
        assert_eq!(
            spec.get_param("basecolor"),
            Some(&ParamValue::Tuple(vec![1.0, 1.0, 1.0]))
        );
        assert!(spec.get_param("metallic").is_none());
    }

    #[test]
    fn metal_sets_only_metallic_and_roughness() {
        let spec = PrincipledShader::metal(0.02).to_spec("/obj/m/chrome");
        let names: Vec<&str> = spec.params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["rough", "metallic"]);
        assert_eq!(spec.get_f64("metallic"), Some(1.0));
        assert!(spec.get_param("basecolor").is_none());
    }

    #[test]
    fn material_waits_for_its_shader() {
        let spec = material_spec("/obj/g/mat", "/obj/g/box", "/obj/g/matnet/s");
        assert_eq!(spec.dependencies(), ["/obj/g", "/obj/g/box", "/obj/g/matnet/s"]);
    }
}
