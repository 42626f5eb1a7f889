use serde::{Deserialize, Serialize};

use choreo_core::{ChoreoConfig, ChoreoResult};

use crate::step::Step;

/// A scene as stored on disk: optional config overrides plus the ordered
/// step list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ChoreoConfig>,
    pub steps: Vec<Step>,
}

impl SceneScript {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            config: None,
            steps,
        }
    }

    pub fn with_config(mut self, config: ChoreoConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn from_json_str(contents: &str) -> ChoreoResult<Self> {
        let script: SceneScript = serde_json::from_str(contents)?;
        if let Some(config) = &script.config {
            config.check()?;
        }
        Ok(script)
    }

    pub fn load(path: &std::path::Path) -> ChoreoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> ChoreoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementSpec;
    use crate::layout::AnchorConstraint;
    use choreo_core::ChoreoError;

    #[test]
    fn test_parse_script_without_config() {
        let script = SceneScript::from_json_str(
            r#"{"steps": [
                {"op": "show", "target": "t", "element": {"kind": "text", "content": "hi"}},
                {"op": "pause", "duration": 0.5},
                {"op": "hide", "targets": ["t"]}
            ]}"#,
        )
        .unwrap();
        assert!(script.config.is_none());
        assert_eq!(script.len(), 3);
        assert_eq!(script.steps[1].op_name(), "pause");
    }

    #[test]
    fn test_embedded_config_is_checked() {
        let err = SceneScript::from_json_str(
            r#"{"config": {"stage": {"width": 0.0, "height": 10.0, "fps": 30.0}}, "steps": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ChoreoError::Configuration(_)));
    }

    #[test]
    fn test_json_survives_a_save() {
        let script = SceneScript::new(vec![Step::show(
            "a",
            ElementSpec::formula("x^2"),
            AnchorConstraint::frame_center(),
        )])
        .with_config(ChoreoConfig::default());
        let json = script.to_json_pretty().unwrap();
        let back = SceneScript::from_json_str(&json).unwrap();
        assert_eq!(back.steps, script.steps);
        assert!(back.config.is_some());
    }

    #[test]
    fn test_malformed_json() {
        let err = SceneScript::from_json_str(r#"{"steps": [{"op": "spin"}]}"#).unwrap_err();
        assert!(matches!(err, ChoreoError::Serialization(_)));
    }
}
