use std::sync::Arc;

pub trait ExpansionListener: Send + Sync {
    fn expanded(&self, path: &str);
}

pub struct Tree;

#[form_dispatch::listener_methods]
impl Tree {
    pub fn add_tree_expansion_listener(&self, _l: Arc<dyn ExpansionListener>) {}
    pub fn remove_tree_expansion_listener(&self, _l: Arc<dyn ExpansionListener>) -> bool {
        false
    }
    pub fn add_selection_listener(&self, _l: Arc<dyn ExpansionListener>) -> Result<(), String> {
        Err("read only".into())
    }
    // not a listener method shape: left alone
    pub fn add_change_listener(&self, _path: &str, _l: Arc<dyn ExpansionListener>) {}
    pub fn node_count(&self) -> usize {
        0
    }
}

fn main() {
    let names: Vec<&str> = form_dispatch::capability::listener_methods()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert!(names.contains(&"addTreeExpansionListener"));
    assert!(names.contains(&"removeTreeExpansionListener"));
    assert!(names.contains(&"addSelectionListener"));
    assert!(!names.contains(&"addChangeListener"));
    assert_eq!(Tree.node_count(), 0);
}
