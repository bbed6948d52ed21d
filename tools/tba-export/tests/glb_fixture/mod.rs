//! Programmatic GLB fixture: a three-joint Mixamo-style rig with one clip
//!
//! Node layout:
//!
//! ```text
//! 0 Armature            (not a joint, animated)
//! └─ 1 mixamorigHips    translation [0, 100, 0]
//!    └─ 2 mixamorigSpine translation [0, 10, 0]
//!       └─ 3 mixamorigHead
//! ```
//!
//! The skin lists its joints child-first (Head, Spine, Hips) so importers
//! have to reorder them.
//!
//! Animation "walk" channels:
//! - Hips translation, LINEAR, 3 keyframes
//! - Spine rotation, STEP, 2 keyframes
//! - Head scale, CUBICSPLINE, 2 keyframes (values 1 and 2)
//! - Armature translation, LINEAR (not a joint, must be skipped)

use gltf_json as json;
use json::validation::Checked::Valid;

pub const HIP_TIMES: [f32; 3] = [0.0, 0.5, 1.0];
pub const HIP_TRANSLATIONS: [[f32; 3]; 3] = [[0.0, 100.0, 0.0], [5.0, 98.0, 20.0], [10.0, 100.0, 40.0]];
pub const SPINE_ROTATIONS: [[f32; 4]; 2] = [[0.0, 0.0, 0.0, 1.0], [0.0, 0.5, 0.0, 0.5]];

const SHORT_TIMES: [f32; 2] = [0.0, 1.0];

// Node indices
const ARMATURE_NODE: u32 = 0;
const HIPS_NODE: u32 = 1;
const SPINE_NODE: u32 = 2;
const HEAD_NODE: u32 = 3;

/// Binary chunk plus one buffer view and accessor per appended block
#[derive(Default)]
struct BinBuilder {
    data: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BinBuilder {
    /// Append f32 data and return its accessor index
    fn push(
        &mut self,
        floats: &[f32],
        type_: json::accessor::Type,
        bounds: Option<(f32, f32)>,
    ) -> u32 {
        let offset = self.data.len();
        for f in floats {
            self.data.extend_from_slice(&f.to_le_bytes());
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: (floats.len() * 4).into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: None,
        });

        let components = match type_ {
            json::accessor::Type::Vec3 => 3,
            json::accessor::Type::Vec4 => 4,
            _ => 1,
        };
        let bound = |v: f32| Some(json::Value::Array(vec![json::Value::from(v as f64)]));
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: (floats.len() / components).into(),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::F32,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min: bounds.and_then(|(min, _)| bound(min)),
            max: bounds.and_then(|(_, max)| bound(max)),
            name: None,
            normalized: false,
            sparse: None,
        });
        self.accessors.len() as u32 - 1
    }

    /// Keyframe times with the min/max bounds glTF requires on sampler inputs
    fn push_times(&mut self, times: &[f32]) -> u32 {
        let bounds = (times[0], times[times.len() - 1]);
        self.push(times, json::accessor::Type::Scalar, Some(bounds))
    }
}

fn node(name: &str, translation: Option<[f32; 3]>, child: Option<u32>) -> json::Node {
    json::Node {
        camera: None,
        children: child.map(|c| vec![json::Index::new(c)]),
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation,
        skin: None,
        weights: None,
    }
}

/// Add a sampler and the channel driving `node`'s `path` from it
fn animate(
    samplers: &mut Vec<json::animation::Sampler>,
    channels: &mut Vec<json::animation::Channel>,
    input: u32,
    output: u32,
    interpolation: json::animation::Interpolation,
    node: u32,
    path: json::animation::Property,
) {
    samplers.push(json::animation::Sampler {
        input: json::Index::new(input),
        interpolation: Valid(interpolation),
        output: json::Index::new(output),
        extensions: Default::default(),
        extras: Default::default(),
    });
    channels.push(json::animation::Channel {
        sampler: json::Index::new(samplers.len() as u32 - 1),
        target: json::animation::Target {
            node: json::Index::new(node),
            path: Valid(path),
            extensions: Default::default(),
            extras: Default::default(),
        },
        extensions: Default::default(),
        extras: Default::default(),
    });
}

/// Build the fixture as GLB bytes
pub fn generate_rig_glb() -> Vec<u8> {
    use json::accessor::Type;
    use json::animation::{Interpolation, Property};

    let mut bin = BinBuilder::default();
    let times3 = bin.push_times(&HIP_TIMES);
    let times2 = bin.push_times(&SHORT_TIMES);
    let hips = bin.push(HIP_TRANSLATIONS.as_flattened(), Type::Vec3, None);
    let spine = bin.push(SPINE_ROTATIONS.as_flattened(), Type::Vec4, None);
    // in-tangent, value, out-tangent per keyframe
    let head = bin.push(
        &[
            0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0, 0.0,
        ],
        Type::Vec3,
        None,
    );
    let armature = bin.push(&[0.0, 0.0, 0.0, 0.0, 0.0, 3.0], Type::Vec3, None);

    let nodes = vec![
        node("Armature", None, Some(HIPS_NODE)),
        node("mixamorigHips", Some([0.0, 100.0, 0.0]), Some(SPINE_NODE)),
        node("mixamorigSpine", Some([0.0, 10.0, 0.0]), Some(HEAD_NODE)),
        node("mixamorigHead", None, None),
    ];

    let skins = vec![json::Skin {
        extensions: Default::default(),
        extras: Default::default(),
        inverse_bind_matrices: None,
        joints: vec![
            json::Index::new(HEAD_NODE),
            json::Index::new(SPINE_NODE),
            json::Index::new(HIPS_NODE),
        ],
        name: Some("rig".to_string()),
        skeleton: None,
    }];

    let mut samplers = Vec::new();
    let mut channels = Vec::new();
    let tracks = [
        (times3, hips, Interpolation::Linear, HIPS_NODE, Property::Translation),
        (times2, spine, Interpolation::Step, SPINE_NODE, Property::Rotation),
        (times2, head, Interpolation::CubicSpline, HEAD_NODE, Property::Scale),
        (times2, armature, Interpolation::Linear, ARMATURE_NODE, Property::Translation),
    ];
    for (input, output, interpolation, target, path) in tracks {
        animate(
            &mut samplers,
            &mut channels,
            input,
            output,
            interpolation,
            target,
            path,
        );
    }

    let root = json::Root {
        accessors: bin.accessors,
        animations: vec![json::Animation {
            channels,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some("walk".to_string()),
            samplers,
        }],
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some("tba-export tests".to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        buffers: vec![json::Buffer {
            byte_length: bin.data.len().into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }],
        buffer_views: bin.views,
        cameras: Vec::new(),
        extensions: Default::default(),
        extras: Default::default(),
        extensions_required: Vec::new(),
        extensions_used: Vec::new(),
        images: Vec::new(),
        materials: Vec::new(),
        meshes: Vec::new(),
        nodes,
        samplers: Vec::new(),
        scene: Some(json::Index::new(0)),
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: vec![json::Index::new(ARMATURE_NODE)],
        }],
        skins,
        textures: Vec::new(),
    };

    assemble_glb(&root, &bin.data)
}

/// Wrap the JSON root and binary chunk in a GLB container
fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Vec<u8> {
    let json_string = json::serialize::to_string(root).expect("Failed to serialize JSON");
    let json_bytes = json_string.as_bytes();

    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let buffer_chunk_length = buffer_data.len() + buffer_padding;
    let total_length = 12 + 8 + json_chunk_length + 8 + buffer_chunk_length;

    let mut glb = Vec::with_capacity(total_length);

    // Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk, space padded
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(b' ', json_padding));

    // BIN chunk, zero padded
    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat_n(0u8, buffer_padding));

    glb
}
