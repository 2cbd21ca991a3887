//! OpenStreetMap links for the parcel location.

use crate::error::ExportError;
use crate::model::GeoPoint;
use std::path::Path;

const EMBED_BASE: &str = "https://www.openstreetmap.org/export/embed.html";
const VIEW_BASE: &str = "https://www.openstreetmap.org/";

/// Half-width of the embedded view in degrees (about 1 km at Bangkok).
pub const DEFAULT_SPAN_DEG: f64 = 0.01;

/// URL for an `<iframe>` embed centred on `point` with a marker.
#[must_use]
pub fn embed_url(point: GeoPoint, span_deg: f64) -> String {
    let span = span_deg.abs();
    let (min_lon, min_lat) = (point.lon - span, point.lat - span);
    let (max_lon, max_lat) = (point.lon + span, point.lat + span);

    format!(
        "{EMBED_BASE}?bbox={min_lon:.5}%2C{min_lat:.5}%2C{max_lon:.5}%2C{max_lat:.5}\
         &layer=mapnik&marker={:.5}%2C{:.5}",
        point.lat, point.lon
    )
}

/// Plain browser link to the location at the given zoom level.
#[must_use]
pub fn view_url(point: GeoPoint, zoom: u8) -> String {
    format!(
        "{VIEW_BASE}?mlat={lat:.5}&mlon={lon:.5}#map={zoom}/{lat:.5}/{lon:.5}",
        lat = point.lat,
        lon = point.lon,
        zoom = zoom.min(19)
    )
}

/// HTML snippet embedding the map.
#[must_use]
pub fn iframe_html(point: GeoPoint, width: u32, height: u32) -> String {
    format!(
        "<iframe width=\"{width}\" height=\"{height}\" frameborder=\"0\" scrolling=\"no\" src=\"{}\"></iframe>",
        embed_url(point, DEFAULT_SPAN_DEG)
    )
}

/// Writes a minimal HTML page holding the embedded map.
pub fn export_map_html<P: AsRef<Path>>(
    point: GeoPoint,
    title: &str,
    path: P,
) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{}\n<p><a href=\"{}\">Open in OpenStreetMap</a></p>\n</body>\n</html>\n",
        iframe_html(point, 800, 600),
        view_url(point, 16),
        title = escape_html(title),
    );
    std::fs::write(path_ref, html).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SILOM: GeoPoint = GeoPoint {
        lat: 13.7286,
        lon: 100.534,
    };

    #[test]
    fn embed_has_bbox_and_marker() {
        let url = embed_url(SILOM, 0.01);
        assert!(url.starts_with(EMBED_BASE));
        assert!(url.contains("bbox=100.52400%2C13.71860%2C100.54400%2C13.73860"));
        assert!(url.contains("marker=13.72860%2C100.53400"));
    }

    #[test]
    fn view_url_clamps_zoom() {
        let url = view_url(SILOM, 30);
        assert!(url.ends_with("#map=19/13.72860/100.53400"));
    }

    #[test]
    fn map_page_escapes_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.html");
        export_map_html(SILOM, "Silom <plot 4>", &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<title>Silom &lt;plot 4&gt;</title>"));
        assert!(html.contains("<iframe width=\"800\""));
        assert!(html.contains("#map=16/13.72860/100.53400"));
    }

    #[test]
    fn iframe_wraps_embed() {
        let html = iframe_html(SILOM, 600, 400);
        assert!(html.starts_with("<iframe width=\"600\" height=\"400\""));
        assert!(html.contains(EMBED_BASE));
    }
}
