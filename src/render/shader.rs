//! Static WGSL sources for the four render passes.
//!
//! All drawing happens in logical pixels; `to_ndc` flips Y so the
//! origin sits at the top-left like the simulation expects.

/// Shared uniform block layout. Must match `render::Uniforms`.
const UNIFORMS_WGSL: &str = r#"
struct Uniforms {
    size: vec2<f32>,
    _pad: vec2<f32>,
    fade_color: vec4<f32>,
    star_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

fn to_ndc(p: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(
        p.x / uniforms.size.x * 2.0 - 1.0,
        1.0 - p.y / uniforms.size.y * 2.0,
    );
}
"#;

/// Fullscreen translucent wash that decays earlier frames.
pub fn fade_shader() -> String {
    format!(
        r#"{UNIFORMS_WGSL}
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {{
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    return vec4<f32>(positions[vertex_index], 0.0, 1.0);
}}

@fragment
fn fs_main() -> @location(0) vec4<f32> {{
    return uniforms.fade_color;
}}
"#
    )
}

/// Tapered trail strokes, one instanced quad per segment.
pub fn segment_shader() -> String {
    format!(
        r#"{UNIFORMS_WGSL}
struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) alpha: f32,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) p0: vec2<f32>,
    @location(1) p1: vec2<f32>,
    @location(2) width: vec2<f32>,
    @location(3) alpha: vec2<f32>,
) -> VertexOutput {{
    // x: position along the segment, y: side of the centerline.
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
    );

    let corner = corners[vertex_index];
    let t = corner.x;

    var dir = p1 - p0;
    let len = length(dir);
    if len < 1e-4 {{
        dir = vec2<f32>(1.0, 0.0);
    }} else {{
        dir = dir / len;
    }}
    let normal = vec2<f32>(-dir.y, dir.x);

    let half_width = mix(width.x, width.y, t) * 0.5;
    let world = mix(p0, p1, t) + normal * half_width * corner.y;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(to_ndc(world), 0.0, 1.0);
    out.alpha = mix(alpha.x, alpha.y, t);
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    return vec4<f32>(uniforms.star_color.rgb, in.alpha);
}}
"#
    )
}

/// Star heads: instanced soft circles.
pub fn head_shader() -> String {
    format!(
        r#"{UNIFORMS_WGSL}
struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) alpha: f32,
    @location(1) uv: vec2<f32>,
}};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) center: vec2<f32>,
    @location(1) radius: f32,
    @location(2) alpha: f32,
) -> VertexOutput {{
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(-1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
    );

    let quad_pos = quad_vertices[vertex_index];
    let world = center + quad_pos * radius;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(to_ndc(world), 0.0, 1.0);
    out.alpha = alpha;
    out.uv = quad_pos;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let dist = length(in.uv);
    if dist > 1.0 {{
        discard;
    }}
    let edge = 1.0 - smoothstep(0.5, 1.0, dist);
    return vec4<f32>(uniforms.star_color.rgb, in.alpha * edge);
}}
"#
    )
}

/// Copies the accumulation texture onto the swapchain.
pub fn blit_shader() -> String {
    r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var scene: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(scene, scene_sampler, in.uv);
}
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_parses(label: &str, source: &str) {
        if let Err(e) = naga::front::wgsl::parse_str(source) {
            panic!("{} shader failed to parse: {:?}", label, e);
        }
    }

    #[test]
    fn all_shaders_are_valid_wgsl() {
        assert_parses("fade", &fade_shader());
        assert_parses("segment", &segment_shader());
        assert_parses("head", &head_shader());
        assert_parses("blit", &blit_shader());
    }
}
