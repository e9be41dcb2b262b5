//! Argument vector construction for the external encoder.

use super::filter_graph::FilterGraph;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
struct MediaInput {
    options: Vec<String>,
    path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GraphKind {
    Simple,
    Complex,
}

/// One encoder run: ordered inputs, an optional filter graph, stream maps and
/// output options for a single output file.
#[derive(Clone, Debug)]
pub struct FfmpegInvocation {
    stage: &'static str,
    inputs: Vec<MediaInput>,
    graph: Option<(GraphKind, FilterGraph)>,
    maps: Vec<String>,
    output_args: Vec<String>,
    output: PathBuf,
    log_level: String,
}

impl FfmpegInvocation {
    pub fn new(stage: &'static str, output: impl AsRef<Path>) -> Self {
        Self {
            stage,
            inputs: Vec::new(),
            graph: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            log_level: "error".to_string(),
        }
    }

    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with(Vec::<String>::new(), path)
    }

    /// Add an input preceded by its own options (`-loop 1`, `-f concat`, ...).
    pub fn input_with<I, S>(mut self, options: I, path: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(MediaInput {
            options: options.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Single-input, single-output graph passed with `-vf`.
    pub fn video_filter(mut self, graph: FilterGraph) -> Self {
        self.graph = Some((GraphKind::Simple, graph));
        self
    }

    pub fn filter_complex(mut self, graph: FilterGraph) -> Self {
        self.graph = Some((GraphKind::Complex, graph));
        self
    }

    /// Map a labelled filter graph output.
    pub fn map_label(mut self, label: &str) -> Self {
        self.maps.push(format!("[{}]", label));
        self
    }

    /// Map an input stream specifier such as `0:v` or `0:a?`.
    pub fn map_stream(mut self, spec: impl Into<String>) -> Self {
        self.maps.push(spec.into());
        self
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn video_codec(self, codec: &str) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn audio_codec(self, codec: &str) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    pub fn pixel_format(self, format: &str) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Move the index to the front so the file can be served progressively.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn graph(&self) -> Option<&FilterGraph> {
        self.graph.as_ref().map(|(_, g)| g)
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-v".to_string(),
            self.log_level.clone(),
        ];

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        if let Some((kind, graph)) = &self.graph {
            args.push(match kind {
                GraphKind::Simple => "-vf".to_string(),
                GraphKind::Complex => "-filter_complex".to_string(),
            });
            args.push(graph.render());
        }

        for map in &self.maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}
