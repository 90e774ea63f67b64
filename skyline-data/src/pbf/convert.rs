//! Conversion from borrowed `osmpbf` elements into owned entities.
//!
//! Nodes and dense nodes both become points; relations are reported as
//! [`Entity::Other`] so consumers can skip them without decoding members.
use osmpbf::Element;
use skyline_core::{Entity, PointEntity, Tags, WayEntity};

pub(super) fn convert_element(element: Element<'_>) -> Entity {
    match element {
        Element::Node(node) => Entity::Point(PointEntity::new(
            node.id(),
            node.lat(),
            node.lon(),
            collect_tags(node.tags()),
        )),
        Element::DenseNode(node) => Entity::Point(PointEntity::new(
            node.id(),
            node.lat(),
            node.lon(),
            collect_tags(node.tags()),
        )),
        Element::Way(way) => Entity::Way(WayEntity {
            id: way.id(),
            node_refs: way.refs().collect(),
            tags: collect_tags(way.tags()),
        }),
        Element::Relation(_) => Entity::Other,
    }
}

fn collect_tags<'a, T>(tags: T) -> Tags
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut collected = Tags::new();
    for (key, value) in tags {
        collected.insert(key.to_owned(), value.to_owned());
    }
    collected
}
