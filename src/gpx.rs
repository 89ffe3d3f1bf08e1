//! GPX route extraction.
//!
//! Streaming parse of the route dialect: a `<gpx>` root containing one
//! `<rte>` with an optional `<name>` and zero-or-more `<rtept>` elements.
//! The extractor is purely structural; numeric validation lives in
//! [`GpsPoint::from_text`]. Unlike lenient GPX converters, a `<rtept>`
//! with missing or malformed coordinates is a hard error, not a skip.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, RouteError};
use crate::GpsPoint;

/// Name and ordered points pulled out of a GPX document, before thinning.
#[derive(Debug)]
pub(crate) struct RawRoute {
    pub name: String,
    pub points: Vec<GpsPoint>,
}

/// Parse a GPX string into a [`RawRoute`].
///
/// Fails with [`RouteError::MalformedXml`] when the text is not
/// well-formed XML or the `<gpx>`/`<rte>` structure is absent.
pub(crate) fn parse_route(xml: &str) -> Result<RawRoute> {
    let mut reader = Reader::from_str(xml);
    let mut saw_gpx = false;
    let mut route: Option<RawRoute> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" => saw_gpx = true,
                b"rte" => {
                    if route.is_none() {
                        route = Some(parse_rte(&mut reader)?);
                    } else {
                        // The dialect has exactly one route; skip extras.
                        reader.read_to_end(e.name()).map_err(xml_error)?;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"gpx" {
                    saw_gpx = true;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    if !saw_gpx {
        return Err(RouteError::MalformedXml(
            "missing <gpx> root element".to_string(),
        ));
    }

    route.ok_or_else(|| RouteError::MalformedXml("missing <rte> element".to_string()))
}

/// Parse the contents of a `<rte>` element.
/// Called after receiving `Event::Start` for the element.
fn parse_rte(reader: &mut Reader<&[u8]>) -> Result<RawRoute> {
    let mut name = String::new();
    let mut points: Vec<GpsPoint> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => {
                    // Absent and all-blank names both end up empty.
                    let text = reader.read_text(e.name()).map_err(xml_error)?;
                    name = text.trim().to_string();
                }
                b"rtept" => {
                    let point = parse_rtept(&e, reader, points.len())?;
                    points.push(point);
                }
                _ => {
                    reader.read_to_end(e.name()).map_err(xml_error)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"rtept" {
                    let attrs = point_attributes(&e, points.len())?;
                    points.push(GpsPoint::from_text(
                        &attrs.lat,
                        &attrs.lon,
                        attrs.ele.as_deref(),
                    )?);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rte" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(RawRoute { name, points })
}

/// Parse a non-empty `<rtept>` element and its children.
///
/// The `ele` attribute takes precedence over a standard-GPX `<ele>`
/// child when both are present.
fn parse_rtept(
    start: &BytesStart<'_>,
    reader: &mut Reader<&[u8]>,
    index: usize,
) -> Result<GpsPoint> {
    let attrs = point_attributes(start, index)?;
    let mut ele_child: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = reader.read_text(e.name()).map_err(xml_error)?;
                    ele_child = Some(text.trim().to_string());
                }
                _ => {
                    // Skip unknown children and extensions.
                    reader.read_to_end(e.name()).map_err(xml_error)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rtept" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    let ele = attrs.ele.or(ele_child);
    GpsPoint::from_text(&attrs.lat, &attrs.lon, ele.as_deref())
}

struct PointAttributes {
    lat: String,
    lon: String,
    ele: Option<String>,
}

/// Read the coordinate attributes off a `<rtept>` start tag.
///
/// `lat` and `lon` are required; their absence fails with
/// [`RouteError::MissingAttribute`] carrying the point's document-order
/// index.
fn point_attributes(e: &BytesStart<'_>, index: usize) -> Result<PointAttributes> {
    let mut lat: Option<String> = None;
    let mut lon: Option<String> = None;
    let mut ele: Option<String> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| RouteError::MalformedXml(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .unwrap_or_default()
            .to_string();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(value),
            b"lon" => lon = Some(value),
            b"ele" => ele = Some(value),
            _ => {}
        }
    }

    let lat = lat.ok_or(RouteError::MissingAttribute {
        index,
        attribute: "lat",
    })?;
    let lon = lon.ok_or(RouteError::MissingAttribute {
        index,
        attribute: "lon",
    })?;

    Ok(PointAttributes { lat, lon, ele })
}

fn xml_error(e: quick_xml::Error) -> RouteError {
    RouteError::MalformedXml(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_route() {
        let xml = r#"<gpx><rte><name>MyRoute</name><rtept lat="-1.00000" lon="0"></rtept></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.name, "MyRoute");
        assert_eq!(route.points.len(), 1);
        assert_eq!(route.points[0].latitude(), -1.0);
        assert_eq!(route.points[0].longitude(), 0.0);
        assert_eq!(route.points[0].elevation(), 0.0);
    }

    #[test]
    fn test_self_closing_rtept() {
        let xml = r#"<gpx><rte><rtept lat="52.91" lon="-1.18"/></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.points.len(), 1);
        assert_eq!(route.points[0].latitude(), 52.91);
    }

    #[test]
    fn test_document_order_preserved() {
        let xml = r#"<gpx><rte>
            <rtept lat="1.0" lon="0"/>
            <rtept lat="3.0" lon="0"/>
            <rtept lat="2.0" lon="0"/>
        </rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        let lats: Vec<f64> = route.points.iter().map(|p| p.latitude()).collect();
        assert_eq!(lats, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_elevation_attribute() {
        let xml = r#"<gpx><rte><rtept lat="52.91" lon="-1.18" ele="35.5"/></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.points[0].elevation(), 35.5);
    }

    #[test]
    fn test_elevation_child_element() {
        let xml = r#"<gpx><rte><rtept lat="52.91" lon="-1.18"><ele>35.5</ele></rtept></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.points[0].elevation(), 35.5);
    }

    #[test]
    fn test_elevation_attribute_wins_over_child() {
        let xml = r#"<gpx><rte><rtept lat="0" lon="0" ele="10"><ele>20</ele></rtept></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.points[0].elevation(), 10.0);
    }

    #[test]
    fn test_name_absent_is_empty() {
        let xml = r#"<gpx><rte><rtept lat="0" lon="0"/></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.name, "");
    }

    #[test]
    fn test_name_blank_is_empty() {
        let xml = r#"<gpx><rte><name>   </name><rtept lat="0" lon="0"/></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.name, "");
    }

    #[test]
    fn test_name_trimmed_interior_kept() {
        let xml = r#"<gpx><rte><name>  My Long Route  </name></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.name, "My Long Route");
    }

    #[test]
    fn test_missing_gpx_root() {
        let err = parse_route(r#"<rte><rtept lat="0" lon="0"/></rte>"#).unwrap_err();
        assert!(matches!(err, RouteError::MalformedXml(_)));
    }

    #[test]
    fn test_missing_rte() {
        let err = parse_route(r#"<gpx></gpx>"#).unwrap_err();
        assert!(matches!(err, RouteError::MalformedXml(_)));
    }

    #[test]
    fn test_missing_lat_attribute() {
        let xml = r#"<gpx><rte><rtept lon="0"/></rte></gpx>"#;
        let err = parse_route(xml).unwrap_err();
        match err {
            RouteError::MissingAttribute { index, attribute } => {
                assert_eq!(index, 0);
                assert_eq!(attribute, "lat");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_lon_reports_point_index() {
        let xml = r#"<gpx><rte>
            <rtept lat="1" lon="2"/>
            <rtept lat="3"/>
        </rte></gpx>"#;
        let err = parse_route(xml).unwrap_err();
        match err {
            RouteError::MissingAttribute { index, attribute } => {
                assert_eq!(index, 1);
                assert_eq!(attribute, "lon");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_latitude() {
        let xml = r#"<gpx><rte><rtept lat="north" lon="0"/></rte></gpx>"#;
        let err = parse_route(xml).unwrap_err();
        match err {
            RouteError::InvalidNumber { attribute, value } => {
                assert_eq!(attribute, "lat");
                assert_eq!(value, "north");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_elements_skipped() {
        let xml = r#"<gpx><rte>
            <desc>Weekend ride</desc>
            <rtept lat="52.0" lon="-1.0">
                <extensions><hr>150</hr></extensions>
            </rtept>
        </rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.points.len(), 1);
    }

    #[test]
    fn test_extra_routes_skipped() {
        let xml = r#"<gpx>
            <rte><name>First</name><rtept lat="1" lon="0"/></rte>
            <rte><name>Second</name><rtept lat="2" lon="0"/></rte>
        </gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.name, "First");
        assert_eq!(route.points.len(), 1);
    }

    #[test]
    fn test_zero_points_is_not_an_error() {
        let xml = r#"<gpx><rte><name>Empty</name></rte></gpx>"#;
        let route = parse_route(xml).unwrap();
        assert_eq!(route.name, "Empty");
        assert!(route.points.is_empty());
    }
}
