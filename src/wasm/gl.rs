//! WebGL2 pipeline shared by every preset.

use log::{debug, error};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation,
};

use crate::color::Rgb;
use crate::config::PresetParams;
use crate::error::{PresetError, Result, ShaderStage};
use crate::preset::{
    PresetKind, UniformValue, FULLSCREEN_TRIANGLE, POSITION_ATTRIBUTE, SAMPLER_UNIFORM,
    TIME_UNIFORM, VERTEX_SHADER,
};

pub fn context(canvas: &HtmlCanvasElement) -> Result<GL> {
    canvas
        .get_context("webgl2")
        .map_err(|e| PresetError::Context(format!("{e:?}")))?
        .ok_or_else(|| PresetError::Context("WebGL2 not supported".into()))?
        .dyn_into::<GL>()
        .map_err(|_| PresetError::Context("unexpected context type".into()))
}

pub fn compile_shader(gl: &GL, stage: ShaderStage, source: &str) -> Result<WebGlShader> {
    let ty = match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    };
    let shader = gl.create_shader(ty).ok_or(PresetError::Resource("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        return Ok(shader);
    }
    let log = gl.get_shader_info_log(&shader).unwrap_or_default();
    gl.delete_shader(Some(&shader));
    error!("{stage} shader: {log}");
    Err(PresetError::ShaderCompile { stage, log })
}

pub fn link_program(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram> {
    let vs = compile_shader(gl, ShaderStage::Vertex, vertex)?;
    let fs = match compile_shader(gl, ShaderStage::Fragment, fragment) {
        Ok(fs) => fs,
        Err(e) => {
            gl.delete_shader(Some(&vs));
            return Err(e);
        }
    };

    let program = gl.create_program();
    if let Some(program) = &program {
        gl.attach_shader(program, &vs);
        gl.attach_shader(program, &fs);
        gl.link_program(program);
    }
    // The program keeps what it needs once linked.
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));

    let program = program.ok_or(PresetError::Resource("program"))?;
    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        return Ok(program);
    }
    let log = gl.get_program_info_log(&program).unwrap_or_default();
    gl.delete_program(Some(&program));
    error!("program link: {log}");
    Err(PresetError::ProgramLink { log })
}

/// Compiled preset: program, full-screen triangle and the analysis texture.
///
/// GPU objects are deleted on drop, so a failed setup leaves nothing behind.
pub struct Pipeline {
    gl: GL,
    program: WebGlProgram,
    buffer: WebGlBuffer,
    texture: WebGlTexture,
    time: Option<WebGlUniformLocation>,
    width: i32,
}

impl Pipeline {
    pub fn new(gl: GL, kind: PresetKind, params: &PresetParams) -> Result<Self> {
        let program = link_program(&gl, VERTEX_SHADER, &kind.fragment_shader())?;
        let (buffer, texture) = match (gl.create_buffer(), gl.create_texture()) {
            (Some(b), Some(t)) => (b, t),
            (b, t) => {
                gl.delete_buffer(b.as_ref());
                gl.delete_texture(t.as_ref());
                gl.delete_program(Some(&program));
                return Err(PresetError::Resource("buffer or texture"));
            }
        };

        let time = gl.get_uniform_location(&program, TIME_UNIFORM);
        let pipeline = Self {
            gl,
            program,
            buffer,
            texture,
            time,
            width: params.bar_count as i32,
        };
        pipeline.bind_geometry()?;
        pipeline.allocate_texture()?;
        pipeline.set_uniforms(kind, params);
        debug!("{kind} pipeline ready ({} samples)", params.bar_count);
        Ok(pipeline)
    }

    fn bind_geometry(&self) -> Result<()> {
        let gl = &self.gl;
        let location = gl.get_attrib_location(&self.program, POSITION_ATTRIBUTE);
        if location < 0 {
            return Err(PresetError::ProgramLink {
                log: format!("attribute {POSITION_ATTRIBUTE} not active"),
            });
        }
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.buffer));
        let vertices = js_sys::Float32Array::from(&FULLSCREEN_TRIANGLE[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(location as u32);
        gl.vertex_attrib_pointer_with_i32(location as u32, 2, GL::FLOAT, false, 0, 0);
        Ok(())
    }

    fn allocate_texture(&self) -> Result<()> {
        let gl = &self.gl;
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        // Nearest: no blending between adjacent bins. Clamp: no wraparound at the ends.
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::NEAREST as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::NEAREST as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
        gl.pixel_storei(GL::UNPACK_ALIGNMENT, 1);
        self.write_texture(None)
    }

    fn write_texture(&self, samples: Option<&[u8]>) -> Result<()> {
        self.gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                GL::TEXTURE_2D,
                0,
                GL::LUMINANCE as i32,
                self.width,
                1,
                0,
                GL::LUMINANCE,
                GL::UNSIGNED_BYTE,
                samples,
            )
            .map_err(|e| PresetError::Context(format!("texture upload: {e:?}")))
    }

    fn set_uniforms(&self, kind: PresetKind, params: &PresetParams) {
        let gl = &self.gl;
        gl.use_program(Some(&self.program));
        let sampler = gl.get_uniform_location(&self.program, SAMPLER_UNIFORM);
        gl.uniform1i(sampler.as_ref(), 0);

        for (name, value) in kind.uniforms(params) {
            // Inactive uniforms have no location; setting None is a no-op.
            let loc = gl.get_uniform_location(&self.program, name);
            match value {
                UniformValue::Float(v) => gl.uniform1f(loc.as_ref(), v),
                UniformValue::Vec2([x, y]) => gl.uniform2f(loc.as_ref(), x, y),
                UniformValue::Vec3([x, y, z]) => gl.uniform3f(loc.as_ref(), x, y, z),
            }
        }
    }

    /// Replace the whole texture with this frame's samples.
    pub fn upload(&self, samples: &[u8]) -> Result<()> {
        self.gl.active_texture(GL::TEXTURE0);
        self.gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        self.write_texture(Some(samples))
    }

    pub fn draw(&self, time: f32, clear: Rgb) {
        let gl = &self.gl;
        gl.viewport(0, 0, gl.drawing_buffer_width(), gl.drawing_buffer_height());
        gl.clear_color(clear.r, clear.g, clear.b, 1.0);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.use_program(Some(&self.program));
        gl.uniform1f(self.time.as_ref(), time);
        gl.draw_arrays(GL::TRIANGLES, 0, 3);
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.gl.delete_texture(Some(&self.texture));
        self.gl.delete_buffer(Some(&self.buffer));
        self.gl.delete_program(Some(&self.program));
    }
}
