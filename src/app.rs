use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::chart::line::LineChart;
use crate::chart::ranking::Ranking;
use crate::data::DashboardData;
use crate::map::{Choropleth, Region, Viewport};

pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 2022;
pub const DEFAULT_YEAR: i32 = YEAR_MAX;

/// Countries offered in the multi-select list
pub const CANDIDATE_COUNTRIES: [&str; 102] = [
    "United States", "Russia", "Iran", "China", "Canada",
    "Afghanistan", "Albania", "Algeria", "Angola", "Argentina",
    "Australia", "Austria", "Azerbaijan", "Bahrain", "Bangladesh",
    "Barbados", "Belarus", "Belgium", "Bolivia", "Bosnia and Herzegovina",
    "Brazil", "Brunei", "Bulgaria", "Cameroon", "Chile",
    "Colombia", "Congo", "Cote d'Ivoire", "Croatia", "Cuba",
    "Czechia", "Czechoslovakia", "Denmark", "East Timor", "Ecuador",
    "Egypt", "Equatorial Guinea", "France", "Gabon", "Georgia",
    "Germany", "Ghana", "Greece", "Hungary", "India",
    "Indonesia", "Iraq", "Ireland", "Israel", "Italy",
    "Japan", "Jordan", "Kazakhstan", "Kuwait", "Kyrgyzstan",
    "Libya", "Malaysia", "Mexico", "Moldova", "Morocco",
    "Mozambique", "Myanmar", "Netherlands", "New Zealand", "Nigeria",
    "Norway", "Oman", "Pakistan", "Papua New Guinea", "Peru",
    "Philippines", "Poland", "Qatar", "Romania", "Saudi Arabia",
    "Senegal", "Serbia", "Slovakia", "Slovenia", "South Africa",
    "South Korea", "Spain", "Switzerland", "Syria", "Taiwan",
    "Tajikistan", "Tanzania", "Thailand", "Trinidad and Tobago", "Tunisia",
    "Turkey", "Turkmenistan", "USSR", "Ukraine", "United Arab Emirates",
    "United Kingdom", "Uzbekistan", "Venezuela", "Vietnam", "World",
    "Yemen", "Yugoslavia",
];

pub const DEFAULT_SELECTION: [&str; 5] =
    ["United States", "Russia", "Iran", "China", "Canada"];

/// Which panel keyboard input is routed to
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Countries,
    Year,
    Map,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Countries => Focus::Year,
            Focus::Year => Focus::Map,
            Focus::Map => Focus::Countries,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Countries => Focus::Map,
            Focus::Year => Focus::Countries,
            Focus::Map => Focus::Year,
        }
    }
}

/// Application state: the loaded data, the built map, the interaction
/// state, and the view models derived from them. Views are recomputed
/// from (data, state) through `refresh` after every mutation; nothing
/// else writes to the derived fields.
pub struct App {
    pub data: DashboardData,
    pub map: Choropleth,
    pub viewport: Viewport,

    /// Multi-select set in selection order
    pub selected: Vec<String>,
    pub year: i32,

    pub focus: Focus,
    pub list_state: ListState,
    /// Incremental search input while the search prompt is open
    pub search: Option<String>,
    /// Region located by the last submitted search
    pub highlight: Option<String>,

    /// Current mouse position for hover tooltips
    pub mouse_pos: Option<(u16, u16)>,
    /// Last mouse position while dragging the map
    pub last_mouse: Option<(u16, u16)>,
    /// Map drawing area from the previous frame, for mouse routing
    pub map_area: Option<Rect>,

    pub line_chart: Option<LineChart>,
    pub ranking: Option<Ranking>,

    pub should_quit: bool,
}

impl App {
    pub fn new(data: DashboardData, map: Choropleth) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        let mut app = Self {
            data,
            map,
            // Real canvas size is set each frame from the map area
            viewport: Viewport::world(2, 4),
            selected: DEFAULT_SELECTION.iter().map(|s| s.to_string()).collect(),
            year: DEFAULT_YEAR,
            focus: Focus::Countries,
            list_state,
            search: None,
            highlight: None,
            mouse_pos: None,
            last_mouse: None,
            map_area: None,
            line_chart: None,
            ranking: None,
            should_quit: false,
        };
        app.refresh();
        app
    }

    /// Re-derive every view model from the current selection state
    pub fn refresh(&mut self) {
        self.line_chart = LineChart::build(&self.data.production, &self.selected);
        self.ranking = Ranking::build(&self.data.production, &self.selected, self.year);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // --- country list ---

    pub fn list_up(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state
            .select(Some(i.checked_sub(1).unwrap_or(CANDIDATE_COUNTRIES.len() - 1)));
    }

    pub fn list_down(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((i + 1) % CANDIDATE_COUNTRIES.len()));
    }

    /// Toggle the country under the cursor in or out of the selection
    pub fn toggle_country(&mut self) {
        let Some(i) = self.list_state.selected() else {
            return;
        };
        let name = CANDIDATE_COUNTRIES[i];
        if let Some(pos) = self.selected.iter().position(|c| c == name) {
            self.selected.remove(pos);
        } else {
            self.selected.push(name.to_string());
        }
        self.refresh();
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|c| c == name)
    }

    // --- year slider ---

    pub fn adjust_year(&mut self, delta: i32) {
        self.set_year(self.year + delta);
    }

    pub fn set_year(&mut self, year: i32) {
        let clamped = year.clamp(YEAR_MIN, YEAR_MAX);
        if clamped != self.year {
            self.year = clamped;
            self.refresh();
        }
    }

    // --- map viewport ---

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        let (w, h) = (self.viewport.width, self.viewport.height);
        self.viewport = Viewport::world(w, h);
        self.highlight = None;
    }

    /// Convert a terminal cell inside the map area to braille pixel
    /// coordinates; None when the cell is outside the map
    pub fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area?;
        if col < area.x
            || row < area.y
            || col >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        Some((
            ((col - area.x) as i32) * 2,
            ((row - area.y) as i32) * 4,
        ))
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            // Less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Region under the mouse cursor, with the cursor cell for tooltip
    /// placement
    pub fn hovered_region(&self) -> Option<(&Region, (u16, u16))> {
        let (col, row) = self.mouse_pos?;
        let (px, py) = self.map_pixel(col, row)?;
        let (lon, lat) = self.viewport.unproject(px, py);
        self.map.hit_test(lon, lat).map(|r| (r, (col, row)))
    }

    // --- search ---

    pub fn begin_search(&mut self) {
        self.search = Some(String::new());
        self.focus = Focus::Map;
    }

    pub fn push_search_char(&mut self, c: char) {
        if let Some(buf) = &mut self.search {
            buf.push(c);
        }
    }

    pub fn pop_search_char(&mut self) {
        if let Some(buf) = &mut self.search {
            buf.pop();
        }
    }

    pub fn cancel_search(&mut self) {
        self.search = None;
    }

    /// Locate the first matching region, recenter onto it and highlight
    /// it. No marker is placed on the located region.
    pub fn submit_search(&mut self) {
        if let Some(query) = self.search.take() {
            if let Some(region) = self.map.locate(&query) {
                self.highlight = Some(region.name.clone());
                self.viewport.focus_on(region.bbox);
            }
        }
    }

    // --- status line ---

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        CountryShape, CumulativeTable, DashboardData, ProductionTable,
    };

    fn fixture() -> App {
        let cumulative = CumulativeTable::from_reader(
            "Country,Cumulative production\nUnited States,1468.0\nRussia,900.0\n".as_bytes(),
        )
        .unwrap();
        let production = ProductionTable::from_reader(
            "Year,United States,Russia,Iran,China,Canada\n\
             2021,33.0,24.0,9.0,7.0,6.0\n\
             2022,36.0,22.0,9.5,7.6,6.4\n"
                .as_bytes(),
        )
        .unwrap();
        let shapes = vec![CountryShape {
            name: "United States".to_string(),
            rings: vec![vec![(-120.0, 30.0), (-80.0, 30.0), (-80.0, 50.0), (-120.0, 50.0)]],
        }];
        let map = Choropleth::build(shapes, &cumulative);
        let data = DashboardData {
            cumulative,
            production,
            shapes: Vec::new(),
        };
        App::new(data, map)
    }

    #[test]
    fn test_defaults() {
        let app = fixture();
        assert_eq!(app.year, 2022);
        assert_eq!(app.selected.len(), 5);
        assert!(app.line_chart.is_some());
        assert!(app.ranking.is_some());
    }

    #[test]
    fn test_toggle_country_rebuilds_views() {
        let mut app = fixture();
        for _ in 0..5 {
            app.toggle_country();
            app.list_down();
        }
        // All five defaults toggled off: empty selection renders nothing
        assert!(app.selected.is_empty());
        assert!(app.line_chart.is_none());
        assert!(app.ranking.is_none());
    }

    #[test]
    fn test_year_clamps_to_range() {
        let mut app = fixture();
        app.set_year(1800);
        assert_eq!(app.year, YEAR_MIN);
        app.set_year(3000);
        assert_eq!(app.year, YEAR_MAX);
    }

    #[test]
    fn test_search_locates_and_highlights() {
        let mut app = fixture();
        app.begin_search();
        for c in "united".chars() {
            app.push_search_char(c);
        }
        app.submit_search();
        assert_eq!(app.highlight.as_deref(), Some("United States"));
        assert!(app.search.is_none());
        // Viewport recentered onto the region bbox
        assert!((app.viewport.center_lon - -100.0).abs() < 1e-9);
    }

    #[test]
    fn test_candidate_list_has_default_selection() {
        for name in DEFAULT_SELECTION {
            assert!(CANDIDATE_COUNTRIES.contains(&name));
        }
    }
}
