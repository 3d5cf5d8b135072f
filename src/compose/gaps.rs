use crate::{
    compose::layer::{ClipRef, LayerKind, LayerSource, ResolvedLayer},
    foundation::core::Span,
    foundation::error::{ReelError, ReelResult},
};

/// Gaps shorter than this are treated as contiguous.
pub const GAP_EPSILON: f64 = 1e-6;

/// Sequences the layers of one stream, inserting filler wherever a clip starts after the time
/// covered so far.
///
/// Callers must feed clips in non-decreasing `start` order. A clip that starts before the cursor
/// (an overlap) is placed at the cursor.
#[derive(Clone, Debug)]
pub struct GapFiller {
    kind: LayerKind,
    filler: LayerSource,
    cursor: f64,
    layers: Vec<ResolvedLayer>,
}

impl GapFiller {
    /// Start an empty stream of `kind`, using `filler` for gaps.
    pub fn new(kind: LayerKind, filler: LayerSource) -> Self {
        Self {
            kind,
            filler,
            cursor: 0.0,
            layers: Vec::new(),
        }
    }

    /// Stream time covered so far.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// `true` once at least one non-filler layer has been placed.
    pub fn has_content(&self) -> bool {
        self.layers.iter().any(|l| !l.source.is_filler())
    }

    /// Place a clip declared at `start` lasting `length`; returns the span it was given.
    pub fn place(
        &mut self,
        start: f64,
        length: f64,
        source: LayerSource,
        origin: ClipRef,
    ) -> ReelResult<Span> {
        if !length.is_finite() || length <= 0.0 {
            return Err(ReelError::validation(format!(
                "{origin}: layer length must be > 0, got {length}"
            )));
        }
        if start > self.cursor + GAP_EPSILON {
            self.fill(start)?;
        } else if start + GAP_EPSILON < self.cursor {
            tracing::debug!(
                %origin,
                declared = start,
                placed = self.cursor,
                "clip overlaps previous layer, placing at cursor"
            );
        }

        let span = Span::starting_at(self.cursor, length)?;
        self.layers.push(ResolvedLayer {
            kind: self.kind,
            span,
            source,
            origin: Some(origin),
        });
        self.cursor = span.end;
        Ok(span)
    }

    /// Extend the stream with filler up to `end`. Returns the filler span if one was added.
    pub fn pad_to(&mut self, end: f64) -> ReelResult<Option<Span>> {
        if end > self.cursor + GAP_EPSILON {
            return self.fill(end).map(Some);
        }
        Ok(None)
    }

    fn fill(&mut self, end: f64) -> ReelResult<Span> {
        let span = Span::new(self.cursor, end)?;
        tracing::debug!(kind = ?self.kind, start = span.start, end = span.end, "inserting filler");
        self.layers.push(ResolvedLayer {
            kind: self.kind,
            span,
            source: self.filler.clone(),
            origin: None,
        });
        self.cursor = end;
        Ok(span)
    }

    /// Finished layer sequence.
    pub fn into_layers(self) -> Vec<ResolvedLayer> {
        self.layers
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/gaps.rs"]
mod tests;
