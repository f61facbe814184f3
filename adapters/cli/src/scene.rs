use robot_game_core::Drawable;
use robot_game_rendering::{
    sprite_size, Color, Scene, SpritePresentation, TilePresentation, Viewport,
};
use robot_game_system_round::RoundController;
use robot_game_world::{query, TileMap};

/// Rebuilds the scene from the round's current state.
///
/// The camera follows the avatar. Tiles are emitted in row-major order, then
/// coins, monsters and finally the avatar so it is drawn on top.
pub(crate) fn populate_scene(round: &RoundController, scene: &mut Scene) {
    let world = round.world();
    let avatar = query::avatar(world);

    scene.clear();
    scene.viewport.center_on(avatar.cell());
    let viewport = scene.viewport;

    scene
        .tiles
        .extend(viewport.visible_tiles().map(|(column, row, cell)| {
            TilePresentation {
                rect: viewport.tile_rect(column, row),
                color: Color::from(TileMap::color_of(query::kind_at(world, cell))),
            }
        }));

    for coin in query::coins(world) {
        push_sprite(&viewport, &coin, &mut scene.sprites);
    }
    for monster in query::monsters(world) {
        push_sprite(&viewport, &monster, &mut scene.sprites);
    }
    push_sprite(&viewport, avatar, &mut scene.sprites);

    scene.status = round.status_text();
}

fn push_sprite<D>(viewport: &Viewport, drawable: &D, out: &mut Vec<SpritePresentation>)
where
    D: Drawable + ?Sized,
{
    let sprite = drawable.sprite();
    if let Some(rect) = viewport.project_entity(drawable.cell(), sprite_size(sprite)) {
        out.push(SpritePresentation { sprite, rect });
    }
}
