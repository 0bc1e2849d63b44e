use bevy::{color::Color, math::Vec2};

/// What the pointer ray hit first.
#[derive(Debug, Clone, PartialEq)]
pub enum Pick<Id> {
    /// The base sphere.
    Globe,
    Country { id: Id, color: Color, name: String },
}

/// Answers "what is under this screen position". Hitting nothing, including an
/// empty scene, is `None` and never an error.
pub trait RayCaster<Id> {
    fn cast_ray(&mut self, pointer: Vec2) -> Option<Pick<Id>>;
}

impl<Id, F> RayCaster<Id> for F
where
    F: FnMut(Vec2) -> Option<Pick<Id>>,
{
    fn cast_ray(&mut self, pointer: Vec2) -> Option<Pick<Id>> {
        self(pointer)
    }
}

/// Side effects the renderer has to carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEffect<Id> {
    /// Recolor `id` with the highlight color and show `name`.
    Highlight { id: Id, name: String },
    /// Put the color `id` had before it was highlighted back.
    Restore { id: Id, color: Color },
    ClearLabel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selected<Id> {
    pub id: Id,
    pub original_color: Color,
    pub name: String,
}

/// Single hover selection. The color to restore lives next to the selected id, so
/// there is never a selection without one.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState<Id> {
    selected: Option<Selected<Id>>,
    dragging: bool,
}

impl<Id> Default for SelectionState<Id> {
    fn default() -> Self {
        Self {
            selected: None,
            dragging: false,
        }
    }
}

impl<Id: Clone + PartialEq> SelectionState<Id> {
    pub fn selected(&self) -> Option<&Selected<Id>> {
        self.selected.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Hit-tests under the pointer and transitions. Does nothing at all, not even a
    /// cast, while a drag is in progress.
    pub fn pointer_moved(&mut self, pointer: Vec2, caster: &mut impl RayCaster<Id>) -> Vec<SelectionEffect<Id>> {
        if self.dragging {
            return Vec::new();
        }
        let hit = caster.cast_ray(pointer);
        self.apply_hit(hit)
    }

    /// A button went down: a camera drag may start, drop the highlight.
    pub fn pointer_down(&mut self) -> Vec<SelectionEffect<Id>> {
        self.dragging = true;
        self.clear()
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// The pointer left the canvas.
    pub fn pointer_left(&mut self) -> Vec<SelectionEffect<Id>> {
        self.clear()
    }

    pub fn apply_hit(&mut self, hit: Option<Pick<Id>>) -> Vec<SelectionEffect<Id>> {
        match hit {
            Some(Pick::Country { id, color, name }) => {
                if self.selected.as_ref().is_some_and(|s| s.id == id) {
                    return Vec::new();
                }
                let mut effects: Vec<_> = self.restore().into_iter().collect();
                effects.push(SelectionEffect::Highlight {
                    id: id.clone(),
                    name: name.clone(),
                });
                self.selected = Some(Selected {
                    id,
                    original_color: color,
                    name,
                });
                effects
            }
            Some(Pick::Globe) | None => self.clear(),
        }
    }

    fn restore(&mut self) -> Option<SelectionEffect<Id>> {
        self.selected.take().map(|s| SelectionEffect::Restore {
            id: s.id,
            color: s.original_color,
        })
    }

    fn clear(&mut self) -> Vec<SelectionEffect<Id>> {
        match self.restore() {
            Some(restore) => vec![restore, SelectionEffect::ClearLabel],
            None => Vec::new(),
        }
    }
}
