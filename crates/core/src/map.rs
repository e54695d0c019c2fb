//! Map rendering: a resource-scoped map view with one marker per point.
//!
//! [`MapView`] owns exactly one map instance obtained from a [`MapRenderer`].
//! Replacing the point list with a different list tears the instance down
//! and builds a fresh one; dropping the view always releases it. There is
//! no incremental marker diffing.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::geo::Coordinates;
use crate::listing::EventRecord;
use crate::types::DbId;

pub const DEFAULT_CENTER: Coordinates = Coordinates {
    longitude: -118.2437,
    latitude: 34.0522,
};
pub const DEFAULT_ZOOM: f64 = 12.0;
pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/streets-v11";

/// Something to pin on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub id: DbId,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub rating: Option<f64>,
    pub category: Option<String>,
}

impl MapPoint {
    /// Events without coordinates are not mappable.
    pub fn from_event(event: &EventRecord) -> Option<Self> {
        let coordinates = event.coordinates?;
        Some(Self {
            id: event.id,
            name: event.title.clone(),
            longitude: coordinates.longitude,
            latitude: coordinates.latitude,
            rating: None,
            category: Some(event.category.clone()),
        })
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.longitude, self.latitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOptions {
    pub center: Coordinates,
    pub zoom: f64,
    pub style: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            style: DEFAULT_STYLE.to_string(),
        }
    }
}

/// A marker with its popup content already rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub point: MapPoint,
    pub popup_html: String,
}

impl Marker {
    pub fn for_point(point: &MapPoint) -> Self {
        Self {
            point: point.clone(),
            popup_html: popup_html(&point.name, point.rating),
        }
    }
}

/// Backend that owns actual map instances.
pub trait MapRenderer {
    type Instance;

    fn create(&mut self, options: &MapOptions) -> Self::Instance;
    fn add_marker(&mut self, instance: &mut Self::Instance, marker: Marker);
    fn release(&mut self, instance: Self::Instance);
}

/// A mounted map showing one list of points.
pub struct MapView<R: MapRenderer> {
    renderer: R,
    options: MapOptions,
    points: Arc<[MapPoint]>,
    instance: Option<R::Instance>,
}

impl<R: MapRenderer> MapView<R> {
    /// Create the map at the default view and add every marker.
    pub fn mount(renderer: R, points: Arc<[MapPoint]>) -> Self {
        let mut view = Self {
            renderer,
            options: MapOptions::default(),
            points,
            instance: None,
        };
        view.build();
        view
    }

    /// Show a new list. Returns `true` when the map was rebuilt, which
    /// happens whenever `points` is not the list already shown.
    pub fn set_points(&mut self, points: Arc<[MapPoint]>) -> bool {
        if Arc::ptr_eq(&self.points, &points) {
            return false;
        }
        self.release();
        self.points = points;
        self.build();
        true
    }

    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    pub fn instance(&self) -> Option<&R::Instance> {
        self.instance.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn build(&mut self) {
        let mut instance = self.renderer.create(&self.options);
        for point in self.points.iter() {
            self.renderer
                .add_marker(&mut instance, Marker::for_point(point));
        }
        tracing::debug!(markers = self.points.len(), "Map instance created");
        self.instance = Some(instance);
    }

    fn release(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.renderer.release(instance);
        }
    }
}

impl<R: MapRenderer> Drop for MapView<R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// `<h3>{name}</h3><p>Rating: {rating}</p>`, with `N/A` for a missing or
/// zero rating.
pub fn popup_html(name: &str, rating: Option<f64>) -> String {
    let rating = match rating {
        Some(r) if r != 0.0 => r.to_string(),
        _ => "N/A".to_string(),
    };
    format!("<h3>{}</h3><p>Rating: {}</p>", escape_html(name), rating)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

/// A map rendered to a GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonMap {
    pub options: MapOptions,
    pub features: Vec<Value>,
}

impl GeoJsonMap {
    /// `FeatureCollection` with an extra `view` member holding the camera.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "view": {
                "center": [self.options.center.longitude, self.options.center.latitude],
                "zoom": self.options.zoom,
                "style": self.options.style,
            },
            "features": self.features,
        })
    }
}

/// Renders maps as GeoJSON documents served to browser map clients.
#[derive(Debug, Default)]
pub struct GeoJsonRenderer {
    pub created: usize,
    pub released: usize,
}

impl MapRenderer for GeoJsonRenderer {
    type Instance = GeoJsonMap;

    fn create(&mut self, options: &MapOptions) -> GeoJsonMap {
        self.created += 1;
        GeoJsonMap {
            options: options.clone(),
            features: Vec::new(),
        }
    }

    fn add_marker(&mut self, instance: &mut GeoJsonMap, marker: Marker) {
        let point = marker.point;
        instance.features.push(json!({
            "type": "Feature",
            "id": point.id,
            "geometry": {
                "type": "Point",
                "coordinates": [point.longitude, point.latitude],
            },
            "properties": {
                "name": point.name,
                "rating": point.rating,
                "category": point.category,
                "popup_html": marker.popup_html,
            },
        }));
    }

    fn release(&mut self, _instance: GeoJsonMap) {
        self.released += 1;
    }
}

/// Mount a throwaway view over `points` and return its GeoJSON.
pub fn render_geojson(points: Arc<[MapPoint]>) -> Value {
    let view = MapView::mount(GeoJsonRenderer::default(), points);
    let doc = view
        .instance()
        .map(GeoJsonMap::to_geojson)
        .unwrap_or(Value::Null);
    doc
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Log {
        created: usize,
        released: usize,
        markers: usize,
    }

    struct CountingRenderer(Rc<RefCell<Log>>);

    impl MapRenderer for CountingRenderer {
        type Instance = ();

        fn create(&mut self, _: &MapOptions) {
            self.0.borrow_mut().created += 1;
        }

        fn add_marker(&mut self, _: &mut (), _: Marker) {
            self.0.borrow_mut().markers += 1;
        }

        fn release(&mut self, _: ()) {
            self.0.borrow_mut().released += 1;
        }
    }

    fn point(id: DbId, name: &str, rating: Option<f64>) -> MapPoint {
        MapPoint {
            id,
            name: name.to_string(),
            longitude: -118.25,
            latitude: 34.05,
            rating,
            category: None,
        }
    }

    fn points(n: usize) -> Arc<[MapPoint]> {
        (0..n).map(|i| point(i as DbId, "Shop", None)).collect()
    }

    #[test]
    fn mount_creates_one_instance_with_all_markers() {
        let log = Rc::new(RefCell::new(Log::default()));
        let _view = MapView::mount(CountingRenderer(log.clone()), points(3));
        assert_eq!(log.borrow().created, 1);
        assert_eq!(log.borrow().markers, 3);
    }

    #[test]
    fn same_list_is_not_rebuilt() {
        let log = Rc::new(RefCell::new(Log::default()));
        let list = points(2);
        let mut view = MapView::mount(CountingRenderer(log.clone()), list.clone());

        assert!(!view.set_points(list));
        assert_eq!(log.borrow().created, 1);
        assert_eq!(log.borrow().released, 0);
    }

    #[test]
    fn new_list_releases_and_rebuilds() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut view = MapView::mount(CountingRenderer(log.clone()), points(2));

        // Equal contents, different list: still rebuilt.
        assert!(view.set_points(points(2)));
        assert_eq!(log.borrow().created, 2);
        assert_eq!(log.borrow().released, 1);
        assert_eq!(log.borrow().markers, 4);
    }

    #[test]
    fn drop_releases_instance() {
        let log = Rc::new(RefCell::new(Log::default()));
        {
            let _view = MapView::mount(CountingRenderer(log.clone()), points(1));
        }
        assert_eq!(log.borrow().released, 1);
    }

    #[test]
    fn popup_escapes_name_and_defaults_rating() {
        assert_eq!(
            popup_html("Tea & <Toast>", None),
            "<h3>Tea &amp; &lt;Toast&gt;</h3><p>Rating: N/A</p>"
        );
        assert_eq!(popup_html("Verve", Some(4.5)), "<h3>Verve</h3><p>Rating: 4.5</p>");
        assert_eq!(popup_html("Verve", Some(0.0)), "<h3>Verve</h3><p>Rating: N/A</p>");
    }

    #[test]
    fn geojson_has_default_view_and_features() {
        let doc = render_geojson(vec![point(7, "Verve", Some(4.7))].into());
        assert_eq!(doc["type"], "FeatureCollection");
        assert_eq!(doc["view"]["center"], json!([-118.2437, 34.0522]));
        assert_eq!(doc["view"]["zoom"], 12.0);
        assert_eq!(doc["view"]["style"], DEFAULT_STYLE);
        assert_eq!(doc["features"][0]["id"], 7);
        assert_eq!(
            doc["features"][0]["geometry"]["coordinates"],
            json!([-118.25, 34.05])
        );
        assert_eq!(
            doc["features"][0]["properties"]["popup_html"],
            "<h3>Verve</h3><p>Rating: 4.7</p>"
        );
    }

    #[test]
    fn events_without_coordinates_are_not_mappable() {
        let event = EventRecord {
            id: 1,
            title: "Market".into(),
            description: String::new(),
            starts_at: chrono::NaiveDateTime::default(),
            location: "Somewhere".into(),
            coordinates: None,
            price: None,
            category: "markets".into(),
            image_url: None,
            slug: "market".into(),
            owner_id: crate::types::UserId::nil(),
            status: crate::status::EventStatus::Approved,
        };
        assert!(MapPoint::from_event(&event).is_none());
    }
}
