//! Skeleton importer (glTF skin -> [`Skeleton`])
//!
//! Joint names, hierarchy and local rest-pose TRS are taken from the skin's
//! joint nodes. Joints are reordered so every parent precedes its children.

use anyhow::{Context, Result};
use hashbrown::HashMap;
use std::path::Path;

use tba_common::{Bone, Skeleton, Transform};

/// Name of a glTF node, falling back to its index for unnamed nodes
pub(crate) fn node_name(node: &gltf::Node) -> String {
    match node.name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("node_{}", node.index()),
    }
}

/// Import the skeleton of a skin in an already loaded document
///
/// A joint's parent is its nearest ancestor node that is also a joint of the
/// skin; joints without one become roots.
pub fn skeleton_from_skin(document: &gltf::Document, skin: &gltf::Skin) -> Result<Skeleton> {
    let joints: Vec<_> = skin.joints().collect();
    if joints.is_empty() {
        anyhow::bail!("Skin '{}' has no joints", skin.name().unwrap_or("unnamed"));
    }

    // Node index -> parent node index, over the whole scene graph
    let mut node_parent: HashMap<usize, usize> = HashMap::new();
    for node in document.nodes() {
        for child in node.children() {
            node_parent.insert(child.index(), node.index());
        }
    }

    let joint_slot: HashMap<usize, usize> = joints
        .iter()
        .enumerate()
        .map(|(slot, joint)| (joint.index(), slot))
        .collect();

    // Parent joint slot of each joint, skipping non-joint intermediates
    let parent_slot: Vec<Option<usize>> = joints
        .iter()
        .map(|joint| {
            let mut current = joint.index();
            while let Some(&parent) = node_parent.get(&current) {
                if let Some(&slot) = joint_slot.get(&parent) {
                    return Some(slot);
                }
                current = parent;
            }
            None
        })
        .collect();

    let depth: Vec<usize> = (0..joints.len())
        .map(|slot| {
            let mut depth = 0;
            let mut current = slot;
            while let Some(parent) = parent_slot[current] {
                depth += 1;
                current = parent;
                if depth > joints.len() {
                    break;
                }
            }
            depth
        })
        .collect();

    // Stable sort by depth keeps the skin's own order among siblings
    let mut order: Vec<usize> = (0..joints.len()).collect();
    order.sort_by_key(|&slot| depth[slot]);

    let mut new_index = vec![0usize; joints.len()];
    for (index, &slot) in order.iter().enumerate() {
        new_index[slot] = index;
    }

    let bones = order
        .iter()
        .map(|&slot| {
            let joint = &joints[slot];
            let (t, r, s) = joint.transform().decomposed();
            Bone::new(
                node_name(joint),
                parent_slot[slot].map(|parent| new_index[parent]),
                Transform {
                    translation: t.map(f64::from),
                    rotation: r.map(f64::from),
                    scale: s.map(f64::from),
                },
            )
        })
        .collect();

    Skeleton::new(bones).with_context(|| {
        format!(
            "Skin '{}' does not form a valid skeleton",
            skin.name().unwrap_or("unnamed")
        )
    })
}

/// Import the first skin of a glTF/GLB file
pub fn import_skeleton(input: &Path) -> Result<Skeleton> {
    let (document, _buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    let skin = document
        .skins()
        .next()
        .with_context(|| format!("No skins found in {:?}", input))?;

    let skeleton = skeleton_from_skin(&document, &skin)?;
    tracing::debug!(
        "Imported skeleton: {} bones from skin '{}'",
        skeleton.len(),
        skin.name().unwrap_or("unnamed")
    );
    Ok(skeleton)
}

/// List available skins in a glTF file
pub fn list_skins(input: &Path) -> Result<()> {
    let (document, _buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    let skins: Vec<_> = document.skins().collect();
    if skins.is_empty() {
        tracing::info!("No skins found in {:?}", input);
        return Ok(());
    }

    tracing::info!("Skins in {:?}:", input);
    for (i, skin) in skins.iter().enumerate() {
        let name = skin.name().unwrap_or("unnamed");
        let joint_count = skin.joints().count();
        tracing::info!("  [{}] '{}': {} joints", i, name, joint_count);
    }

    Ok(())
}
