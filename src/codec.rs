//! The codec interface shared by every carrier container.

use crate::byte::{self, Extracted, Framed, Marker, Unframer};
use crate::capacity::Capacity;
use crate::carrier::Carrier;
use crate::format::Format;
use crate::frequency::QuantizationCodec;
use crate::spatial::LsbCodec;
use crate::Error;

/// An embedding strategy: where the bits of a framed payload live in a carrier
///
/// Implementors provide the capacity function and the embed/extract passes;
/// framing, the capacity check and copying the carrier are shared.
pub trait Codec: Sync {
    fn name(&self) -> &'static str;

    /// Termination marker, used symmetrically by `encode` and `decode`
    fn marker(&self) -> Marker;

    fn capacity(&self, carrier: &Carrier) -> Capacity;

    /// Writes every bit of `payload` into `carrier`
    ///
    /// Callers guarantee `payload` fits in [`Codec::capacity`].
    fn embed(&self, carrier: &mut Carrier, payload: &Framed);

    /// Pushes bits into `sink` in embedding order until it terminates or the
    /// carrier is exhausted
    fn extract(&self, carrier: &Carrier, sink: &mut Unframer);

    /// Returns a copy of `carrier` holding `text`
    ///
    /// Fails before touching any pixel if the text cannot be framed or does
    /// not fit.
    fn encode(&self, carrier: &Carrier, text: &str) -> Result<Carrier, Error> {
        let payload = byte::frame(text, self.marker())?;
        let capacity = self.capacity(carrier);
        log::debug!(
            "{}: embedding {} bits into {}x{} carrier, capacity {} bits",
            self.name(),
            payload.len_bits(),
            carrier.width(),
            carrier.height(),
            capacity.bits()
        );
        capacity.check(payload.len_bits())?;
        let mut out = carrier.clone();
        self.embed(&mut out, &payload);
        log::info!("{}: embedded {} bytes of text", self.name(), text.len());
        Ok(out)
    }

    fn decode(&self, carrier: &Carrier) -> Extracted {
        let mut sink = Unframer::new(self.marker());
        self.extract(carrier, &mut sink);
        let extracted = sink.finish();
        match &extracted {
            Extracted::NoMarkerFound { text, .. } => log::info!(
                "{}: no marker found, returning {} best-effort chars",
                self.name(),
                text.chars().count()
            ),
            other => log::info!(
                "{}: extracted {} bytes of text",
                self.name(),
                other.text().len()
            ),
        }
        extracted
    }
}

static LSB: LsbCodec = LsbCodec;
static QUANTIZATION: QuantizationCodec = QuantizationCodec;

/// The codec used for carriers stored as `format`
pub fn for_format(format: Format) -> &'static dyn Codec {
    match format {
        Format::Png | Format::Bmp | Format::WebP => &LSB,
        Format::Jpeg => &QUANTIZATION,
    }
}
