//! Shared scene fixtures for unit tests.

pub(crate) const FOREST: &str = r#"{
    "id": "forest",
    "name": "Enchanted Forest",
    "duration": 10,
    "environment": { "backgroundColor": { "r": 0.1, "g": 0.2, "b": 0.1 } },
    "walls": [
        { "id": 1, "name": "North", "direction": "north",
          "camera": { "position": { "x": 0, "y": 2, "z": 10 }, "fov": 60, "near": 0.1,
            "far": 1000 } },
        { "id": 2, "name": "South", "direction": "south",
          "camera": { "position": { "x": 0, "y": 2, "z": -10 }, "fov": 60, "near": 0.1,
            "far": 1000 },
          "specificLayers": ["sky"] }
    ],
    "layers": [
        { "id": "forest", "name": "Forest", "visible": true, "opacity": 1, "renderOrder": 1,
          "models": [ { "id": "oak_tree", "src": "/models/oak.glb",
                        "position": { "x": 1, "y": 0, "z": -3 }, "animations": ["sway"] } ],
          "particles": [ { "id": "snow", "type": "snow", "count": 100,
                           "position": { "x": 0, "y": 5, "z": 0 },
                           "area": { "x": 20, "y": 10, "z": 20 },
                           "speed": 1, "color": { "r": 1, "g": 1, "b": 1 },
                           "opacity": 0.8, "size": 0.1 } ],
          "audio": [ { "id": "forest_ambient", "src": "/audio/forest.mp3", "volume": 0.5,
            "loop": true } ] },
        { "id": "sky", "name": "Sky", "visible": true, "opacity": 1, "renderOrder": 0,
          "lights": [ { "id": "sun", "type": "directional", "color": { "r": 1, "g": 0.9, "b": 0.8 },
                        "intensity": 1.5, "position": { "x": 5, "y": 10, "z": 5 } } ] }
    ],
    "modifiers": [
        { "id": "show_forest", "name": "Show forest", "type": "boolean", "default": true,
          "affects": ["forest"] },
        { "id": "snow_count", "name": "Snow amount", "type": "number", "default": 100, "min": 0,
          "max": 100, "step": 1 }
    ],
    "timeline": { "events": [ { "time": 5, "action": "audio", "target": "forest_ambient" } ] }
}"#;

pub(crate) const PROGRAM: &str = r#"{
    "id": "seasons",
    "name": "Seasons",
    "description": "Four seasons around the room",
    "author": "Studio",
    "version": "1.0.0",
    "scenes": [
        { "id": "forest", "name": "Enchanted Forest", "duration": 10 },
        { "id": "space", "name": "Deep Space" }
    ],
    "globalAudio": [
        { "id": "background_music", "src": "/audio/theme.mp3", "volume": 0.4, "loop": true }
    ]
}"#;
