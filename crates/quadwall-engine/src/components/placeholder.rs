use serde::Serialize;

/// Stand-in geometry for a model whose asset is loading, failed, or is a
/// `primitive:` source. Chosen from the entity id alone so the same model
/// always gets the same stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "variant", rename_all = "camelCase")]
pub enum Placeholder {
    /// Unit sphere tinted with a body color (`0xRRGGBB`).
    Sphere(u32),
    Cube,
    Cylinder,
    Ring,
    Tree(TreeKind),
    Rock(RockKind),
    Creature(CreatureKind),
    /// Grey wireframe box, 1×2×1.
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    Oak,
    Pine,
    Birch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RockKind {
    Formation,
    Crystal,
    Boulder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatureKind {
    Unicorn,
    Spirit,
}

const WHITE: u32 = 0xffffff;

impl Placeholder {
    /// Pick the stand-in for an entity id (case-insensitive).
    pub fn for_id(id: &str) -> Self {
        let id = id.to_lowercase();
        let has = |s: &str| id.contains(s);

        match id.as_str() {
            "sun" => return Self::Sphere(0xffcc00),
            "mercury" => return Self::Sphere(0x8c7853),
            "venus" => return Self::Sphere(0xffb649),
            "earth" => return Self::Sphere(0x6b93d6),
            "mars" => return Self::Sphere(0xcd5c5c),
            "jupiter" => return Self::Sphere(0xd8ca9d),
            "saturn" => return Self::Sphere(0xfab27b),
            "sphere" => return Self::Sphere(WHITE),
            "cube" | "box" => return Self::Cube,
            "cylinder" => return Self::Cylinder,
            "ring" => return Self::Ring,
            _ => {}
        }

        if has("tree") {
            return Self::Tree(if has("oak") {
                TreeKind::Oak
            } else if has("pine") {
                TreeKind::Pine
            } else if has("birch") {
                TreeKind::Birch
            } else {
                TreeKind::Oak
            });
        }
        if has("rock") || has("boulder") || has("stone") {
            return Self::Rock(if has("formation") {
                RockKind::Formation
            } else if has("crystal") {
                RockKind::Crystal
            } else {
                RockKind::Boulder
            });
        }
        if has("creature") || has("spirit") || has("unicorn") {
            return Self::Creature(if has("unicorn") {
                CreatureKind::Unicorn
            } else {
                CreatureKind::Spirit
            });
        }
        Self::Generic
    }
}
