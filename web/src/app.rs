use gloo::events::EventListener;
use gloo::net::http::Request;
use gloo::utils::{document, window};
use serde::Deserialize;
use std::collections::HashSet;
use tashbets_core as core;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, HtmlSelectElement, KeyboardEvent};
use yew::prelude::*;

use crate::storage::LocalStore;

const TILE_DIMENSIONS: u32 = 40;

/// Query parameter carrying a shared progress snapshot.
const SHARE_PARAM: &str = "share";

#[derive(Clone, Debug, PartialEq, Deserialize)]
struct IndexInfo {
    ids: Vec<u32>,
}

pub(crate) struct PuzzleSession {
    info: core::PuzzleInfo,
    grid: core::Grid,
    nav: core::NavState,
    store: core::PuzzleStore<LocalStore>,
    highlight: HashSet<core::Coord2>,
    current_clue: Option<(core::ClueId, core::Direction)>,
}

impl PuzzleSession {
    /// Edits are only wired up for state we own; someone else's shared
    /// snapshot stays read-only until explicitly imported.
    fn editable(&self) -> bool {
        self.store.source() != core::StorageSource::UrlParam
    }

    fn letter_at(&self, coords: core::Coord2) -> Option<char> {
        self.store.get_letter(coords).ok().flatten()
    }

    /// Row-major letters with `#` standing in for blocked and unfilled
    /// cells, the string the solution hash is computed over.
    fn solution_string(&self) -> String {
        let (rows, cols) = self.grid.size();
        let mut out = String::new();
        for row in 0..rows {
            for col in 0..cols {
                out.push(self.letter_at((row, col)).unwrap_or('#'));
            }
        }
        out
    }
}

pub(crate) enum Msg {
    PuzzleReady(Box<PuzzleSession>),
    ShowIndex(Vec<u32>),
    Nav(core::NavEvent),
    Key(String),
    ToggleSolved(core::ClueId, core::Direction),
    Share,
    ImportShared,
    CheckSolution,
    SolutionResult(bool),
}

enum View {
    Loading,
    Puzzle(PuzzleSession),
    Index(Vec<u32>),
}

pub(crate) struct App {
    view: View,
    share_url: Option<String>,
    solution_ok: Option<bool>,
    _key_listener: Option<EventListener>,
}

async fn fetch_puzzle(id: &str) -> Option<core::PuzzleInfo> {
    let response = Request::get(&format!("crosswords/{id}.json"))
        .send()
        .await
        .ok()?;
    if !response.ok() {
        return None;
    }
    response.json().await.ok()
}

async fn fetch_index() -> Vec<u32> {
    async fn inner() -> Option<IndexInfo> {
        let response = Request::get("index.json").send().await.ok()?;
        response.json().await.ok()
    }
    inner().await.map(|index| index.ids).unwrap_or_default()
}

/// Loads by puzzle id, falling back to the index on any failure: fetch
/// error, malformed JSON, or a data-integrity error in the grid. No retries.
async fn load(id: Option<String>, share: Option<String>) -> Msg {
    if let Some(id) = id {
        if let Some(info) = fetch_puzzle(&id).await {
            match core::Grid::build(&info) {
                Ok(grid) => {
                    let store =
                        core::PuzzleStore::open(LocalStore, &grid, share.as_deref());
                    return Msg::PuzzleReady(Box::new(PuzzleSession {
                        info,
                        grid,
                        nav: core::NavState::default(),
                        store,
                        highlight: HashSet::new(),
                        current_clue: None,
                    }));
                }
                Err(err) => log::error!("unusable puzzle {id}: {err}"),
            }
        }
    }
    Msg::ShowIndex(fetch_index().await)
}

fn query_param(name: &str) -> Option<String> {
    let search = window().location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get(name)
}

fn local_query(puzzle_id: u32) -> String {
    format!("?id={puzzle_id}")
}

/// Rewrites the address bar to the plain puzzle URL, so reloading after an
/// import lands on the now-local state instead of the shared view.
fn strip_share_param(puzzle_id: u32) {
    if let Ok(history) = window().history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&local_query(puzzle_id)));
    }
}

fn focus_cell((row, col): core::Coord2) {
    let id = format!("cell_input_r{row}_c{col}");
    if let Some(element) = document().get_element_by_id(&id) {
        if let Ok(input) = element.dyn_into::<HtmlElement>() {
            let _ = input.focus();
        }
    }
}

/// Keys accepted for letter entry: the Hebrew block plus lowercase Latin.
fn grid_letter(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None)
            if ('\u{0590}'..='\u{05FF}').contains(&letter) || letter.is_ascii_lowercase() =>
        {
            Some(letter)
        }
        _ => None,
    }
}

fn key_event(key: &str) -> Option<core::NavEvent> {
    match key {
        "Backspace" => Some(core::NavEvent::Backspace),
        "Delete" => Some(core::NavEvent::Delete),
        key => grid_letter(key).map(core::NavEvent::Letter),
    }
}

async fn sha512_hex(text: String) -> Option<String> {
    let subtle = window().crypto().ok()?.subtle();
    let mut data = text.into_bytes();
    let promise = subtle.digest_with_str_and_u8_array("SHA-512", &mut data).ok()?;
    let digest = wasm_bindgen_futures::JsFuture::from(promise).await.ok()?;
    let bytes = js_sys::Uint8Array::new(&digest).to_vec();
    Some(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
}

impl App {
    fn session_mut(&mut self) -> Option<&mut PuzzleSession> {
        match &mut self.view {
            View::Puzzle(session) => Some(session),
            _ => None,
        }
    }

    fn handle_nav(&mut self, event: core::NavEvent) -> bool {
        let Some(session) = self.session_mut() else {
            return false;
        };
        let effects = session.nav.apply(&session.grid, event);
        for effect in effects {
            match effect {
                core::Effect::Highlight(cells) => {
                    session.highlight = cells.into_iter().collect();
                }
                core::Effect::ShowClue(id, direction) => {
                    session.current_clue = Some((id, direction));
                }
                core::Effect::Focus(coords) => focus_cell(coords),
                core::Effect::WriteLetter(coords, letter) => {
                    if let Err(err) = session.store.set_letter(coords, Some(letter)) {
                        log::error!("letter write failed: {err}");
                    }
                }
                core::Effect::ClearLetter(coords) => {
                    if let Err(err) = session.store.set_letter(coords, None) {
                        log::error!("letter clear failed: {err}");
                    }
                }
                core::Effect::ClearHighlight => {
                    session.highlight.clear();
                    session.current_clue = None;
                }
            }
        }
        true
    }

    fn build_share_url(&mut self) -> Option<String> {
        let session = self.session_mut()?;
        let puzzle_id = session.grid.puzzle_id();
        let exported = match session.store.export() {
            Ok(exported) => exported,
            Err(err) => {
                log::error!("export failed: {err}");
                return None;
            }
        };
        let token = match core::snapshot::compress(&exported) {
            Ok(token) => token,
            Err(err) => {
                log::error!("snapshot compression failed: {err}");
                return None;
            }
        };
        let location = window().location();
        let origin = location.origin().unwrap_or_default();
        let path = location.pathname().unwrap_or_default();
        let encoded = String::from(js_sys::encode_uri_component(&token));
        Some(format!("{origin}{path}?id={puzzle_id}&{SHARE_PARAM}={encoded}"))
    }

    fn grid_view(&self, ctx: &Context<Self>, session: &PuzzleSession) -> Html {
        let (rows, cols) = session.grid.size();
        let width = TILE_DIMENSIONS * cols as u32;
        let height = TILE_DIMENSIONS * rows as u32;
        let active = session.nav.active();

        let on_background = ctx
            .link()
            .callback(|_| Msg::Nav(core::NavEvent::BackgroundClick));

        html! {
            <svg width={width.to_string()} height={height.to_string()} onclick={on_background}>
                {
                    for (0..rows).flat_map(|row| (0..cols).map(move |col| (row, col))).map(|coords| {
                        self.tile_view(ctx, session, coords, active)
                    })
                }
            </svg>
        }
    }

    fn tile_view(
        &self,
        ctx: &Context<Self>,
        session: &PuzzleSession,
        coords: core::Coord2,
        active: Option<core::Coord2>,
    ) -> Html {
        let (row, col) = coords;
        let x = TILE_DIMENSIONS * col as u32;
        let y = TILE_DIMENSIONS * row as u32;
        let cell = session.grid.cell_at(coords);

        let fill = if !cell.is_open() {
            "black"
        } else if active == Some(coords) {
            "#ffffcc"
        } else if session.highlight.contains(&coords) {
            "#ccffff"
        } else {
            "white"
        };

        let onclick = ctx.link().callback(move |e: MouseEvent| {
            e.stop_propagation();
            Msg::Nav(core::NavEvent::CellClick(coords))
        });

        let letter = session.letter_at(coords);
        let letter_fill = match letter {
            // Display-only accent for Latin input; storage is unchanged.
            Some(letter) if core::is_latin_letter(letter) => "red",
            _ => "black",
        };

        html! {
            <g key={format!("r{row}c{col}")} {onclick}>
                <rect
                    x={x.to_string()}
                    y={y.to_string()}
                    width={TILE_DIMENSIONS.to_string()}
                    height={TILE_DIMENSIONS.to_string()}
                    stroke="black"
                    stroke-width="1"
                    fill={fill}
                />
                if cell.is_open() {
                    if let Some(id) = session.grid.clue_at(coords) {
                        <text
                            x={(x + TILE_DIMENSIONS - 4).to_string()}
                            y={(y + 12).to_string()}
                            style="fill: black; font-size: 10px;"
                        >
                            { id }
                        </text>
                    }
                    <text
                        x={(x + TILE_DIMENSIONS / 2).to_string()}
                        y={(y + TILE_DIMENSIONS - TILE_DIMENSIONS / 4).to_string()}
                        text-anchor="middle"
                        style="font-size: 30px;"
                        fill={letter_fill}
                    >
                        { letter.map(String::from).unwrap_or_default() }
                    </text>
                }
            </g>
        }
    }

    /// Offscreen focus proxies so on-screen keyboards open when a tile is
    /// selected.
    fn input_proxies(&self, session: &PuzzleSession) -> Html {
        let (rows, cols) = session.grid.size();
        html! {
            <div class="input-proxies">
                {
                    for (0..rows).map(|row| html! {
                        <div class="grid-row">
                            {
                                for (0..cols).map(|col| html! {
                                    <input
                                        type="text"
                                        class="cell-input"
                                        id={format!("cell_input_r{row}_c{col}")}
                                    />
                                })
                            }
                        </div>
                    })
                }
            </div>
        }
    }

    fn clue_list(
        &self,
        ctx: &Context<Self>,
        session: &PuzzleSession,
        direction: core::Direction,
    ) -> Html {
        let editable = session.editable();
        html! {
            <dl>
                {
                    for session.info.definitions.for_direction(direction).iter().map(|(&id, text)| {
                        let solved = session.store.get_clue_solved(id, direction).unwrap_or(false);
                        let class = classes!(solved.then_some("solved"));
                        let on_select = ctx
                            .link()
                            .callback(move |_| Msg::Nav(core::NavEvent::ClueClick(id, direction)));
                        let on_toggle = editable.then(|| {
                            ctx.link().callback(move |_| Msg::ToggleSolved(id, direction))
                        });
                        html! {
                            <>
                                <dt class={class.clone()} onclick={on_toggle}>{ format!("[{id}]") }</dt>
                                <dd {class} onclick={on_select}>{ text.clone() }</dd>
                            </>
                        }
                    })
                }
            </dl>
        }
    }

    fn puzzle_view(&self, ctx: &Context<Self>, session: &PuzzleSession) -> Html {
        let current_clue = session.current_clue.and_then(|(id, direction)| {
            session
                .info
                .definitions
                .for_direction(direction)
                .get(&id)
                .map(|text| format!("[{id}] {text}"))
        });
        let cb_share = ctx.link().callback(|_| Msg::Share);
        let cb_import = ctx.link().callback(|_| Msg::ImportShared);
        let cb_check = ctx.link().callback(|_| Msg::CheckSolution);

        html! {
            <div class="tashbets">
                <header>
                    <h1>{ format!("תשבץ {}", session.info.id) }</h1>
                    <small>{ session.info.author.clone() }</small>
                </header>
                if !session.editable() {
                    <aside class="shared-banner">
                        { "צפייה בפתרון משותף" }
                        <button onclick={cb_import}>{ "שמירה אצלי" }</button>
                    </aside>
                }
                <div class="crossword">
                    { self.grid_view(ctx, session) }
                    { self.input_proxies(session) }
                </div>
                if let Some(text) = current_clue {
                    <p class="current-clue">{ text }</p>
                }
                <section class="clues">
                    <div class="clues-across">
                        <h3>{ "מאוזן" }</h3>
                        { self.clue_list(ctx, session, core::Direction::Across) }
                    </div>
                    <div class="clues-down">
                        <h3>{ "מאונך" }</h3>
                        { self.clue_list(ctx, session, core::Direction::Down) }
                    </div>
                </section>
                <footer>
                    <button onclick={cb_share}>{ "שיתוף התקדמות" }</button>
                    if let Some(url) = &self.share_url {
                        <input class="share-url" readonly=true value={url.clone()}/>
                    }
                    if session.info.sol_hash.as_deref().is_some_and(|hash| !hash.is_empty()) {
                        <button onclick={cb_check}>{ "בדיקת פתרון" }</button>
                    }
                    if let Some(ok) = self.solution_ok {
                        <p class={classes!(if ok { "success" } else { "failure" })}>
                            { if ok { "כל הכבוד! פתרתם את התשבץ!" } else { "לא בדיוק... נסו שוב." } }
                        </p>
                    }
                </footer>
            </div>
        }
    }

    fn index_view(&self, ids: &[u32]) -> Html {
        let mut sorted = ids.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let onchange = Callback::from(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            if !value.is_empty() {
                let _ = window().location().set_href(&format!("?id={value}"));
            }
        });

        html! {
            <div class="index">
                <h2>{ "בחירת תשבץ" }</h2>
                <select {onchange}>
                    <option value="" selected=true>{ "תשבץ" }</option>
                    {
                        for sorted.iter().map(|id| html! {
                            <option value={id.to_string()}>{ format!("תשבץ #{id}") }</option>
                        })
                    }
                </select>
            </div>
        }
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let id = query_param("id");
        let share = query_param(SHARE_PARAM);
        ctx.link().send_future(load(id, share));
        Self {
            view: View::Loading,
            share_url: None,
            solution_ok: None,
            _key_listener: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::PuzzleReady(session) => {
                document().set_title(&format!("תשבץ {}", session.info.id));
                self.view = View::Puzzle(*session);
                true
            }
            Msg::ShowIndex(ids) => {
                self.view = View::Index(ids);
                true
            }
            Msg::Nav(event) => self.handle_nav(event),
            Msg::Key(key) => match key_event(&key) {
                Some(event) => self.handle_nav(event),
                None => false,
            },
            Msg::ToggleSolved(id, direction) => {
                let Some(session) = self.session_mut() else {
                    return false;
                };
                let solved = session.store.get_clue_solved(id, direction).unwrap_or(false);
                if let Err(err) = session.store.set_clue_solved(id, direction, !solved) {
                    log::error!("solved toggle failed: {err}");
                    return false;
                }
                true
            }
            Msg::Share => {
                self.share_url = self.build_share_url();
                self.share_url.is_some()
            }
            Msg::ImportShared => {
                let Some(session) = self.session_mut() else {
                    return false;
                };
                let snapshot = session.store.state().clone();
                let puzzle_id = session.grid.puzzle_id();
                match session.store.import(snapshot) {
                    Ok(()) => {
                        strip_share_param(puzzle_id);
                        true
                    }
                    Err(err) => {
                        log::error!("import failed: {err}");
                        false
                    }
                }
            }
            Msg::CheckSolution => {
                let Some(session) = self.session_mut() else {
                    return false;
                };
                let Some(expected) = session.info.sol_hash.clone() else {
                    return false;
                };
                let current = session.solution_string();
                ctx.link().send_future(async move {
                    let matches = sha512_hex(current).await.as_deref() == Some(expected.as_str());
                    Msg::SolutionResult(matches)
                });
                false
            }
            Msg::SolutionResult(ok) => {
                self.solution_ok = Some(ok);
                true
            }
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        // Mutating listeners are only wired for editable state; a shared
        // snapshot view simply never hears about keys.
        let editable = matches!(&self.view, View::Puzzle(session) if session.editable());
        if editable && self._key_listener.is_none() {
            let link = ctx.link().clone();
            self._key_listener = Some(EventListener::new(
                &gloo::utils::body(),
                "keyup",
                move |event| {
                    if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                        link.send_message(Msg::Key(event.key()));
                    }
                },
            ));
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match &self.view {
            View::Loading => html! { <div class="loader"/> },
            View::Puzzle(session) => self.puzzle_view(ctx, session),
            View::Index(ids) => self.index_view(ids),
        }
    }
}
