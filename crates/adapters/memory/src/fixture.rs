//! Markup of the hosted dashboard view, rendered into a [`MemoryPage`].
//!
//! The element ids, classes and marker attributes match the defaults in
//! `flashboard_app::settings`.

use std::rc::Rc;

use flashboard_app::ports::PageDom;

use crate::page::{Element, MemoryPage, NodeId};

/// Inline style of the dashboard grid before the compact layout.
pub const GRID_STYLE: &str = "display: grid; gap: 20px; padding: 20px";
/// Inline padding of the page header before the compact layout.
pub const HEADER_PADDING: &str = "16px 16px";

/// Handles to the regions of a rendered dashboard view.
#[derive(Debug, Clone)]
pub struct DashboardFixture {
    pub page: Rc<MemoryPage>,
    pub marker: NodeId,
    /// `#page-nav`.
    pub header: NodeId,
    /// `.report-header`, where the control is mounted.
    pub report_header: NodeId,
    /// Parent of `.dashboard-rendered-filters`.
    pub filters: NodeId,
    /// Grandparent of `.report-type-description`.
    pub description: NodeId,
    /// `#workspace-content`.
    pub workspace: NodeId,
    /// The `Dashboards--*` panels inside the workspace.
    pub panels: Vec<NodeId>,
}

impl DashboardFixture {
    /// A fresh page showing the dashboard for `bookmark`, grid included.
    #[must_use]
    pub fn new(bookmark: &str) -> Self {
        let page = Rc::new(MemoryPage::new());
        let fixture = Self::render(Rc::clone(&page), bookmark);
        fixture.render_grid();
        fixture
    }

    /// Render the dashboard view for `bookmark` into `page`, without the
    /// grid. Use [`render_grid`](Self::render_grid) to add it later.
    pub fn render(page: Rc<MemoryPage>, bookmark: &str) -> Self {
        let props = serde_json::json!({ "meta": { "bookmarkId": bookmark } }).to_string();
        let marker = page.insert(
            None,
            Element::new("div")
                .attr("data-react-class", "Dashboards")
                .attr("data-react-props", props),
        );

        let header = page.insert(
            None,
            Element::new("div")
                .id("page-nav")
                .style("padding", HEADER_PADDING),
        );
        let report_header = page.insert(
            Some(header),
            Element::new("div")
                .class("report-header")
                .child(Element::new("h1").text("Dashboard")),
        );

        let filters = page.insert(
            None,
            Element::new("div")
                .class("filters-bar")
                .child(Element::new("div").class("dashboard-rendered-filters")),
        );
        let description = page.insert(
            None,
            Element::new("section").child(
                Element::new("div").child(
                    Element::new("p")
                        .class("report-type-description")
                        .text("Team dashboard"),
                ),
            ),
        );

        let workspace = page.insert(None, Element::new("div").id("workspace-content"));
        let panels = ["Dashboards--panel", "Dashboards--panel Dashboards--wide"]
            .into_iter()
            .map(|class| page.insert(Some(workspace), Element::new("div").class(class)))
            .collect();

        Self {
            page,
            marker,
            header,
            report_header,
            filters,
            description,
            workspace,
            panels,
        }
    }

    /// Render the dashboard grid, as the host does some time after the rest.
    pub fn render_grid(&self) -> NodeId {
        self.render_grid_styled(GRID_STYLE)
    }

    /// Render `#Dashboard-Grid` with its own inline `style`.
    pub fn render_grid_styled(&self, style: &str) -> NodeId {
        self.page.insert(
            Some(self.workspace),
            Element::new("div").id("Dashboard-Grid").attr("style", style),
        )
    }

    /// The grid, when rendered.
    #[must_use]
    pub fn grid(&self) -> Option<NodeId> {
        self.page.element_by_id("Dashboard-Grid")
    }

    /// Every inline style the compact layout touches, for before/after
    /// comparisons.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Option<String>> {
        let mut nodes = vec![self.header, self.filters, self.description];
        nodes.extend(self.panels.iter().copied());
        nodes.extend(self.grid());
        nodes
            .into_iter()
            .map(|node| self.page.inline_style(node))
            .collect()
    }
}

/// A page that is not a dashboard: same header, no marker.
#[must_use]
pub fn non_dashboard_page() -> Rc<MemoryPage> {
    let page = Rc::new(MemoryPage::new());
    let header = page.insert(
        None,
        Element::new("div")
            .id("page-nav")
            .style("padding", HEADER_PADDING),
    );
    page.insert(Some(header), Element::new("div").class("report-header"));
    page.insert(
        None,
        Element::new("div")
            .attr("data-react-class", "Features")
            .attr("data-react-props", "{}"),
    );
    page
}
