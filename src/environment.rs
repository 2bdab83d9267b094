use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Lexical scope chain. Each environment owns its local bindings and holds a
/// shared reference to the enclosing scope, so closures captured by function
/// values keep their defining scope alive after the call that created it has
/// returned.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            outer: None,
        }
    }

    /// A new child scope whose outer link is `outer`.
    pub fn enclosed_by(outer: Rc<RefCell<Environment>>) -> Self {
        Self {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Chained lookup: local store first, then outward. A total miss yields
    /// `Null` rather than an error; undefined variables are not a runtime
    /// failure in this language.
    pub fn get(&self, name: &str) -> Value {
        if let Some(value) = self.store.get(name) {
            value.clone()
        } else if let Some(ref outer) = self.outer {
            outer.borrow().get(name)
        } else {
            Value::Null
        }
    }

    /// Always writes into this environment's own store, never the outer
    /// chain, so an inner `let` shadows without mutating the outer binding.
    pub fn set(&mut self, name: &str, value: Value) {
        self.store.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_yields_null() {
        let env = Environment::new();
        assert_eq!(env.get("nope"), Value::Null);
    }

    #[test]
    fn lookup_walks_outer_chain() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().set("a", Value::Integer(1));

        let inner = Environment::enclosed_by(Rc::clone(&outer));
        assert_eq!(inner.get("a"), Value::Integer(1));
    }

    #[test]
    fn set_shadows_without_touching_outer() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().set("a", Value::Integer(1));

        let mut inner = Environment::enclosed_by(Rc::clone(&outer));
        inner.set("a", Value::Integer(2));

        assert_eq!(inner.get("a"), Value::Integer(2));
        assert_eq!(outer.borrow().get("a"), Value::Integer(1));
    }
}
