//! Builds the `-filter_complex` graph for laying a music bed under a voice track.
//!
//! Input 0 is the voice, input 1 is the music. The music is looped forever and
//! `amix` stops at the end of the voice (`duration=first`).

const MUSIC_LOOP: &str = "aloop=loop=-1:size=2147483647";
const SIDECHAIN: &str = "sidechaincompress=threshold=0.02:ratio=8:attack=5:release=2000";
const AMIX: &str = "amix=inputs=2:duration=first:dropout_transition=3";
const LOUDNORM: &str = "loudnorm=I=-16:TP=-1.5:LRA=11";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixGraph {
    pub music_volume: f64,
    pub duck: bool,
    pub loudnorm: bool,
}

impl MixGraph {
    pub fn filter_complex(&self) -> String {
        let mut graph = format!("[1:a]{MUSIC_LOOP},volume={}[m];", self.music_volume);

        if self.duck {
            graph.push_str(&format!("[m][0:a]{SIDECHAIN}[bg];"));
            graph.push_str(&format!("[0:a][bg]{AMIX}[mix]"));
        } else {
            graph.push_str(&format!("[0:a][m]{AMIX}[mix]"));
        }

        if self.loudnorm {
            graph.push_str(&format!(";[mix]{LOUDNORM}[out]"));
        }

        graph
    }

    /// Label passed to `-map`.
    pub fn output_label(&self) -> &'static str {
        if self.loudnorm { "[out]" } else { "[mix]" }
    }
}
