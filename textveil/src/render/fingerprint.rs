use crate::fonts::registry::FontFace;
use crate::layers::resolver::LayerResolver;
use crate::style::document::StyleDocument;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5f3a_91c4_0d7e_b2a6;

/// Stable identity of everything a rendered frame depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FrameFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for FrameFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub(crate) struct FrameKeyInputs<'a> {
    pub(crate) doc: &'a StyleDocument,
    pub(crate) background: &'a LayerResolver,
    pub(crate) subject: &'a LayerResolver,
    pub(crate) face: Option<&'a FontFace>,
    pub(crate) scale: f64,
}

pub(crate) fn fingerprint_frame(inputs: &FrameKeyInputs<'_>) -> FrameFingerprint {
    let mut h = StableHasher::new();
    write_doc(&mut h, inputs.doc);
    for layer in [inputs.background, inputs.subject] {
        let (generation, state) = layer.identity();
        h.write_u64(generation);
        h.write_u8(state);
    }
    match inputs.face {
        None => h.write_u8(0),
        Some(face) => {
            h.write_u8(1);
            h.write_str(face.family.as_str());
            h.write_u32(u32::from(face.weight.get()));
        }
    }
    h.write_f64(inputs.scale);
    h.finish()
}

fn write_doc(h: &mut StableHasher, doc: &StyleDocument) {
    h.write_str(&doc.normalized_text());
    h.write_str(&doc.text_color);
    h.write_f64(doc.font_size);
    h.write_u32(u32::from(doc.font_weight.get()));
    h.write_str(doc.font_family.as_str());
    h.write_f64(doc.position.x);
    h.write_f64(doc.position.y);
    h.write_f64(doc.rotation);
    h.write_f64(doc.opacity);
    h.write_str(&doc.background_color);
    h.write_bool(doc.overlay);
    h.write_f64(doc.brightness);
    h.write_f64(doc.contrast);
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    // Length-prefixed so adjacent strings cannot alias.
    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fingerprint.rs"]
mod tests;
