//! Skeleton (bone hierarchy with bind pose)
//!
//! Bones are stored parent-first: bone 0 is the root and every other bone's
//! parent index points at an earlier bone.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::TbaError;

/// Rigid bind transform (TRS)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Translation [x, y, z]
    pub translation: [f64; 3],
    /// Quaternion rotation [x, y, z, w]
    pub rotation: [f64; 4],
    /// Scale [x, y, z]
    pub scale: [f64; 3],
}

impl Transform {
    /// Identity transform (no rotation, no translation, unit scale)
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    pub fn from_translation(translation: [f64; 3]) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Single bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone (`None` for the root)
    #[serde(default)]
    pub parent: Option<usize>,
    /// Local bind-pose transform
    #[serde(default)]
    pub bind: Transform,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<usize>, bind: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            bind,
        }
    }
}

/// Ordered bone hierarchy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Build a skeleton, validating the hierarchy
    pub fn new(bones: Vec<Bone>) -> Result<Self, TbaError> {
        let skeleton = Self { bones };
        skeleton.validate()?;
        Ok(skeleton)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Index of the bone called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn find(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Bind-pose transform of the bone called `name`
    pub fn bind_pose(&self, name: &str) -> Option<&Transform> {
        self.find(name).map(|b| &b.bind)
    }

    /// Check hierarchy invariants:
    /// - bone 0 (if any) is a root
    /// - parents point at earlier bones (no forward or cyclic references)
    /// - names are non-empty and unique
    /// - bind transforms are finite
    pub fn validate(&self) -> Result<(), TbaError> {
        let mut seen = HashSet::with_capacity(self.bones.len());

        for (i, bone) in self.bones.iter().enumerate() {
            if bone.name.is_empty() {
                return Err(TbaError::validation(format!("bone {} has an empty name", i)));
            }
            if !seen.insert(bone.name.as_str()) {
                return Err(TbaError::validation(format!(
                    "bone {} '{}': duplicate bone name",
                    i, bone.name
                )));
            }
            match bone.parent {
                Some(_) if i == 0 => {
                    return Err(TbaError::validation(format!(
                        "bone 0 '{}': root bone cannot have a parent",
                        bone.name
                    )));
                }
                Some(parent) if parent >= i => {
                    return Err(TbaError::validation(format!(
                        "bone {} '{}': parent index {} must precede the bone",
                        i, bone.name, parent
                    )));
                }
                _ => {}
            }

            let bind = &bone.bind;
            let finite = bind
                .translation
                .iter()
                .chain(&bind.rotation)
                .chain(&bind.scale)
                .all(|v| v.is_finite());
            if !finite {
                return Err(TbaError::validation(format!(
                    "bone {} '{}': non-finite bind transform",
                    i, bone.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn bone(name: &str, parent: Option<usize>) -> Bone {
        Bone::new(name, parent, Transform::IDENTITY)
    }

    #[test]
    fn test_skeleton_lookup() {
        let skeleton = Skeleton::new(vec![
            Bone::new("Hips", None, Transform::from_translation([0.0, 1.0, 0.0])),
            bone("Spine", Some(0)),
            bone("Head", Some(1)),
        ])
        .unwrap();

        assert_eq!(skeleton.len(), 3);
        assert_eq!(skeleton.index_of("Head"), Some(2));
        assert_eq!(skeleton.bind_pose("Hips").unwrap().translation, [0.0, 1.0, 0.0]);
        assert!(skeleton.find("Tail").is_none());
    }

    #[test]
    fn test_forward_parent_rejected() {
        let err = Skeleton::new(vec![bone("Hips", None), bone("Spine", Some(2)), bone("Head", Some(0))])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("'Spine'"));
    }

    #[test]
    fn test_self_parent_rejected() {
        assert!(Skeleton::new(vec![bone("Hips", None), bone("Spine", Some(1))]).is_err());
    }

    #[test]
    fn test_parented_root_rejected() {
        assert!(Skeleton::new(vec![bone("Hips", Some(0))]).is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Skeleton::new(vec![bone("Hips", None), bone("Hips", Some(0))]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_non_finite_bind_rejected() {
        let bad = Bone::new("Hips", None, Transform::from_translation([f64::NAN, 0.0, 0.0]));
        assert!(Skeleton::new(vec![bad]).is_err());
    }

    #[test]
    fn test_bone_json_defaults() {
        let skeleton: Skeleton =
            serde_json::from_str(r#"[{"name": "Hips"}, {"name": "Spine", "parent": 0}]"#).unwrap();
        assert_eq!(skeleton.bones()[1].parent, Some(0));
        assert_eq!(skeleton.bones()[0].bind, Transform::IDENTITY);
        assert!(skeleton.validate().is_ok());
    }
}
