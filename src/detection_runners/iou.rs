use crate::common::CardBox;

/// Intersection over union of two boxes given as `(cx, cy, w, h)`.
///
/// Returns 0 when the union is empty (both boxes degenerate).
pub fn iou_cxcywh(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> f32 {
    let (cx1, cy1, w1, h1) = a;
    let (cx2, cy2, w2, h2) = b;
    let (x1a, y1a, x1b, y1b) = (cx1 - w1 / 2.0, cy1 - h1 / 2.0, cx1 + w1 / 2.0, cy1 + h1 / 2.0);
    let (x2a, y2a, x2b, y2b) = (cx2 - w2 / 2.0, cy2 - h2 / 2.0, cx2 + w2 / 2.0, cy2 + h2 / 2.0);

    let iw = (x1b.min(x2b) - x1a.max(x2a)).max(0.0);
    let ih = (y1b.min(y2b) - y1a.max(y2a)).max(0.0);
    let inter = iw * ih;
    let a1 = (x1b - x1a) * (y1b - y1a);
    let a2 = (x2b - x2a) * (y2b - y2a);
    let union = a1 + a2 - inter;
    if union <= 0.0 { 0.0 } else { inter / union }
}

/// Same as [`iou_cxcywh`] for corner boxes.
pub fn iou_boxes(a: &CardBox, b: &CardBox) -> f32 {
    iou_cxcywh(a.cxy_wh(), b.cxy_wh())
}
