//! Clean export: strips editor bookkeeping from a copy of the tree and
//! serializes the result for pasting back into the source document.

use super::{Node, for_each_element_mut, write_nodes};

/// Classes the editor paints onto elements while interacting.
const DIRTY_CLASSES: [&str; 3] = ["selected-cell", "editing-cell", "drag-over"];

/// Attributes the editor maintains for its own use. `title` is put back
/// from `data-org-title` before this list is applied, so the original
/// tooltip text survives a round trip through the editor.
const DIRTY_ATTRS: [&str; 9] = [
    "data-row",
    "data-col",
    "data-addr",
    "data-tooltip",
    "data-org-title",
    "contenteditable",
    "spellcheck",
    "data-resize-col",
    "data-resize-row",
];

/// Serializes a cleaned copy of the document. The live tree is left
/// untouched. Every `><` seam gets a newline so the output diffs well.
pub fn clean_html(nodes: &[Node]) -> String {
    let mut copy: Vec<Node> = nodes.to_vec();
    for_each_element_mut(&mut copy, &mut |el| {
        for class in DIRTY_CLASSES {
            el.remove_class(class);
        }
        if el.attr("class") == Some("") {
            el.remove_attr("class");
        }
        if let Some(original) = el.attr("data-org-title").map(String::from) {
            el.set_attr("title", &original);
        }
        for name in DIRTY_ATTRS {
            el.remove_attr(name);
        }
        if el.attr("style") == Some("") {
            el.remove_attr("style");
        }
    });
    write_nodes(&copy).replace("><", ">\n<").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_fragment;

    #[test]
    fn strips_editor_classes_and_attributes() {
        let nodes = parse_fragment(concat!(
            "<table><tr>",
            "<td class=\"num selected-cell\" data-row=\"0\" data-col=\"0\" ",
            "data-addr=\"A1\" data-tooltip=\"[Qty]\" contenteditable=\"false\">5</td>",
            "<td class=\"editing-cell\" data-row=\"0\" data-col=\"1\">6</td>",
            "</tr></table>"
        ))
        .expect("parse");
        let cleaned = clean_html(&nodes);
        assert!(cleaned.contains("class=\"num\""));
        assert!(!cleaned.contains("selected-cell"));
        assert!(!cleaned.contains("editing-cell"));
        assert!(!cleaned.contains("data-row"));
        assert!(!cleaned.contains("data-addr"));
        assert!(!cleaned.contains("data-tooltip"));
        assert!(!cleaned.contains("contenteditable"));
        assert!(!cleaned.contains("class=\"\""));
    }

    #[test]
    fn restores_title_from_saved_original() {
        let nodes = parse_fragment(
            "<td data-org-title=\"unit price\" data-tooltip=\"Title: unit price\">9</td>",
        )
        .expect("parse");
        let cleaned = clean_html(&nodes);
        assert!(cleaned.contains("title=\"unit price\""));
        assert!(!cleaned.contains("data-org-title"));
        assert!(!cleaned.contains("data-tooltip"));
    }

    #[test]
    fn drops_empty_style_attribute() {
        let nodes = parse_fragment("<td style=\"\">1</td><td style=\"width: 40px;\">2</td>")
            .expect("parse");
        let cleaned = clean_html(&nodes);
        assert!(!cleaned.contains("style=\"\""));
        assert!(cleaned.contains("style=\"width: 40px;\""));
    }

    #[test]
    fn splits_tag_seams_onto_lines() {
        let nodes = parse_fragment("<table><tr><td>1</td></tr></table>").expect("parse");
        assert_eq!(
            clean_html(&nodes),
            "<table>\n<tr>\n<td>1</td>\n</tr>\n</table>"
        );
    }

    #[test]
    fn live_tree_is_untouched() {
        let nodes = parse_fragment("<td data-row=\"0\" class=\"selected-cell\">x</td>")
            .expect("parse");
        let before = nodes.clone();
        let _ = clean_html(&nodes);
        assert_eq!(nodes, before);
    }
}
