//! WGSL sources. Every pipeline shares the frame uniforms and the sky model
//! in [`COMMON`]; [`compose`] prepends it to a pipeline's own source.

/// Frame uniforms, vertex layout and the procedural sky.
///
/// `sky_radiance` mirrors `seascape_sky::sky_radiance`; change both together.
pub const COMMON: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    sky_sun: vec4<f32>,
    water_sun: vec4<f32>,
    sun_radiance: vec4<f32>,
    sky_ambient: vec4<f32>,
    ground_ambient: vec4<f32>,
    // turbidity, rayleigh, mie coefficient, mie directional g
    sky_params: vec4<f32>,
    // rgb, alpha
    water_color: vec4<f32>,
    // time, size, distortion scale, unused
    water_params: vec4<f32>,
    sun_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

const PI: f32 = 3.141592653589793;
const DAY_ZENITH: vec3<f32> = vec3<f32>(0.16, 0.34, 0.72);
const NIGHT_ZENITH: vec3<f32> = vec3<f32>(0.01, 0.015, 0.04);
const DAY_HORIZON: vec3<f32> = vec3<f32>(0.62, 0.72, 0.85);
const DUSK_HORIZON: vec3<f32> = vec3<f32>(0.85, 0.45, 0.22);
const SUN_TINT: vec3<f32> = vec3<f32>(1.0, 0.9, 0.75);
const SUN_DISC_COS: f32 = 0.99996;
const MIE_GAIN: f32 = 40.0;
const EXPOSURE: f32 = 1.5;

fn instance_model(instance: InstanceInput) -> mat4x4<f32> {
    return mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
}

fn tonemap(color: vec3<f32>) -> vec3<f32> {
    return vec3<f32>(1.0) - exp(-color * EXPOSURE);
}

fn rayleigh_phase(cos_theta: f32) -> f32 {
    return 3.0 / (16.0 * PI) * (1.0 + cos_theta * cos_theta);
}

fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = max(1.0 + g2 - 2.0 * g * cos_theta, 1e-4);
    return (1.0 - g2) / (4.0 * PI * pow(denom, 1.5));
}

fn sky_radiance(dir_in: vec3<f32>) -> vec3<f32> {
    let dir = normalize(dir_in);
    let sun = normalize(frame.sky_sun.xyz);
    let day = smoothstep(-0.1, 0.25, sun.y);

    let zenith = mix(NIGHT_ZENITH, DAY_ZENITH, day) * (frame.sky_params.y * 0.5);
    let haze = clamp(frame.sky_params.x / 10.0, 0.0, 2.0);
    let horizon = mix(mix(DUSK_HORIZON, DAY_HORIZON, day), vec3<f32>(0.9), 0.25 * haze)
        * (0.05 + 0.95 * max(day, smoothstep(-0.3, 0.0, sun.y) * 0.4));

    let elevation = max(dir.y, 0.0);
    var color = mix(horizon, zenith, pow(elevation, 0.45));

    let cos_theta = clamp(dot(dir, sun), -1.0, 1.0);
    color += horizon * rayleigh_phase(cos_theta) * 0.5 * day;
    color += SUN_TINT
        * henyey_greenstein(cos_theta, frame.sky_params.w)
        * frame.sky_params.z
        * MIE_GAIN
        * (0.25 + day);

    if (cos_theta > SUN_DISC_COS) {
        color += SUN_TINT * 8.0 * max(day, 0.05);
    }

    if (dir.y < 0.0) {
        let depth = sqrt(min(-dir.y, 1.0));
        color = mix(color, horizon * 0.35, depth);
    }

    return color;
}
"#;

/// Sky dome. Drawn first, without depth writes.
pub const SKY_SHADER: &str = r#"
@vertex
fn vs_sky(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let world_pos = instance_model(instance) * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = vertex.normal;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_sky(in: VertexOutput) -> @location(0) vec4<f32> {
    let dir = in.world_pos - frame.camera_pos.xyz;
    return vec4<f32>(tonemap(sky_radiance(dir)), 1.0);
}
"#;

/// Lit meshes: the demo cube and loaded models.
pub const MESH_SHADER: &str = r#"
@vertex
fn vs_mesh(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = instance_model(instance);
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_mesh(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let v = normalize(frame.camera_pos.xyz - in.world_pos);
    let l = normalize(frame.sky_sun.xyz);

    let ambient = mix(frame.ground_ambient.rgb, frame.sky_ambient.rgb, n.y * 0.5 + 0.5);
    let diffuse = max(dot(n, l), 0.0) * frame.sun_radiance.rgb;
    let base = in.color.rgb * (ambient + diffuse);

    // Smooth dielectric: reflect the sky, weighted by Schlick fresnel.
    let fresnel = 0.04 + 0.96 * pow(1.0 - max(dot(n, v), 0.0), 5.0);
    let reflected = sky_radiance(reflect(-v, n));
    let color = mix(base, reflected, fresnel);

    return vec4<f32>(tonemap(color), in.color.a);
}
"#;

/// Water surface with scrolling normal-map noise.
pub const WATER_SHADER: &str = r#"
@group(1) @binding(0)
var normal_map: texture_2d<f32>;
@group(1) @binding(1)
var normal_sampler: sampler;

fn water_noise(uv: vec2<f32>, time: f32) -> vec4<f32> {
    let uv0 = uv / 103.0 + vec2<f32>(time / 17.0, time / 29.0);
    let uv1 = uv / 107.0 - vec2<f32>(time / -19.0, time / 31.0);
    let uv2 = uv / vec2<f32>(8907.0, 9803.0) + vec2<f32>(time / 101.0, time / 97.0);
    let uv3 = uv / vec2<f32>(1091.0, 1027.0) - vec2<f32>(time / 109.0, time / -113.0);
    let noise = textureSample(normal_map, normal_sampler, uv0)
        + textureSample(normal_map, normal_sampler, uv1)
        + textureSample(normal_map, normal_sampler, uv2)
        + textureSample(normal_map, normal_sampler, uv3);
    return noise * 0.5 - 1.0;
}

@vertex
fn vs_water(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let world_pos = instance_model(instance) * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = vec3<f32>(0.0, 1.0, 0.0);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_water(in: VertexOutput) -> @location(0) vec4<f32> {
    let time = frame.water_params.x;
    let size = frame.water_params.y;
    let distortion_scale = frame.water_params.z;

    let noise = water_noise(in.world_pos.xz * size, time);
    let n = normalize(noise.xzy * vec3<f32>(1.5, 1.0, 1.5));

    let to_eye = frame.camera_pos.xyz - in.world_pos;
    let dist = length(to_eye);
    let eye = to_eye / max(dist, 1e-4);
    let sun = frame.water_sun.xyz;
    let sun_color = frame.sun_color.rgb * frame.sun_radiance.rgb;

    let mirrored = reflect(-sun, n);
    let specular = pow(max(dot(eye, mirrored), 0.0), 100.0) * sun_color * 2.0;
    let diffuse = max(dot(sun, n), 0.0) * sun_color * 0.5;

    let distortion = n.xz * (0.001 + 1.0 / max(dist, 1.0)) * distortion_scale;
    var view_reflect = reflect(-eye, n) + vec3<f32>(distortion.x, 0.0, distortion.y);
    view_reflect.y = abs(view_reflect.y);
    let reflection = sky_radiance(view_reflect);

    let theta = max(dot(eye, n), 0.0);
    let rf0 = 0.3;
    let reflectance = rf0 + (1.0 - rf0) * pow(1.0 - theta, 5.0);
    let scatter = max(dot(n, eye), 0.0) * frame.water_color.rgb;
    let body = (diffuse * 0.3 + scatter) * (frame.sky_ambient.rgb + sun_color * 0.5);
    let color = mix(body, reflection + specular, reflectance);

    return vec4<f32>(tonemap(color), frame.water_color.a);
}
"#;

/// Prepend the shared definitions to a pipeline's shader source.
pub fn compose(source: &str) -> String {
    let mut out = String::with_capacity(COMMON.len() + source.len());
    out.push_str(COMMON);
    out.push_str(source);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composed_sources_carry_entry_points() {
        for (source, entries) in [
            (SKY_SHADER, ["vs_sky", "fs_sky"]),
            (MESH_SHADER, ["vs_mesh", "fs_mesh"]),
            (WATER_SHADER, ["vs_water", "fs_water"]),
        ] {
            let full = compose(source);
            assert!(full.starts_with(COMMON));
            for entry in entries {
                assert!(full.contains(&format!("fn {entry}(")), "missing {entry}");
            }
        }
    }
}
