use chrono::{DateTime, SecondsFormat};

use crate::asset_cache::AssetCache;
use crate::export::Record;
use crate::http_client::HttpTransport;
use crate::match_model::{MatchDocument, Participant};

pub const ITEM_SLOTS: usize = 7;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedItem {
    pub id: String,
    pub name: String,
    pub icon_path: String,
}

/// One exported row: the target player's view of one match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerMatchRow {
    pub match_id: Option<String>,
    pub end_of_game_result: Option<String>,
    pub game_mode: Option<String>,
    pub game_name: Option<String>,
    pub game_start_utc: Option<String>,
    pub duration_sec: Option<i64>,
    pub game_version: Option<String>,
    pub win: Option<bool>,
    pub game_ended_in_early_surrender: Option<bool>,
    pub champion_name: Option<String>,
    pub lane: Option<String>,
    pub champ_level: Option<i64>,
    pub gold_earned: Option<i64>,
    pub items_purchased: Option<i64>,
    pub items: Vec<ResolvedItem>,
    pub vision_score: Option<i64>,
    pub damage_dealt: Option<i64>,
    pub damage_dealt_to_champions: Option<i64>,
    pub damage_dealt_to_buildings: Option<i64>,
    pub damage_dealt_to_objectives: Option<i64>,
    pub damage_dealt_to_turrets: Option<i64>,
    pub damage_taken: Option<i64>,
    pub minions_killed: Option<i64>,
    pub baron_kills: Option<i64>,
    pub dragon_kills: Option<i64>,
    pub first_blood_kill: Option<bool>,
    pub first_blood_assist: Option<bool>,
    pub first_tower_kill: Option<bool>,
    pub kills: Option<i64>,
    pub solo_kills: Option<i64>,
    pub double_kills: Option<i64>,
    pub triple_kills: Option<i64>,
    pub quadra_kills: Option<i64>,
    pub penta_kills: Option<i64>,
    pub largest_multi_kill: Option<i64>,
    pub kill_participation: Option<f64>,
    pub deaths: Option<i64>,
    pub assists: Option<i64>,
}

impl PlayerMatchRow {
    /// `;`-joined ids of the occupied slots.
    pub fn item_ids(&self) -> String {
        join_non_empty(self.items.iter().map(|i| i.id.as_str()))
    }

    /// `;`-joined names of the items found in the catalog.
    pub fn item_names(&self) -> String {
        join_non_empty(self.items.iter().map(|i| i.name.as_str()))
    }

    /// `;`-joined local icon paths of the items whose icon is cached.
    pub fn item_icons(&self) -> String {
        join_non_empty(self.items.iter().map(|i| i.icon_path.as_str()))
    }

    /// Flattens the row into the fixed export column order.
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("match_id", self.match_id.clone())
            .with("end_of_game_result", self.end_of_game_result.clone())
            .with("game_mode", self.game_mode.clone())
            .with("game_name", self.game_name.clone())
            .with("game_start_utc", self.game_start_utc.clone())
            .with("duration_sec", self.duration_sec)
            .with("game_version", self.game_version.clone())
            .with("win", self.win)
            .with(
                "game_ended_in_early_surrender",
                self.game_ended_in_early_surrender,
            )
            .with("champion_name", self.champion_name.clone())
            .with("lane", self.lane.clone())
            .with("champ_level", self.champ_level)
            .with("gold_earned", self.gold_earned)
            .with("items_purchased", self.items_purchased)
            .with("items", self.item_ids())
            .with("item_names", self.item_names())
            .with("item_icons", self.item_icons())
            .with("vision_score", self.vision_score)
            .with("damage_dealt", self.damage_dealt)
            .with("damage_dealt_to_champions", self.damage_dealt_to_champions)
            .with("damage_dealt_to_buildings", self.damage_dealt_to_buildings)
            .with("damage_dealt_to_objectives", self.damage_dealt_to_objectives)
            .with("damage_dealt_to_turrets", self.damage_dealt_to_turrets)
            .with("damage_taken", self.damage_taken)
            .with("minions_killed", self.minions_killed)
            .with("baron_kills", self.baron_kills)
            .with("dragon_kills", self.dragon_kills)
            .with("first_blood_kill", self.first_blood_kill)
            .with("first_blood_assist", self.first_blood_assist)
            .with("first_tower_kill", self.first_tower_kill)
            .with("kills", self.kills)
            .with("solo_kills", self.solo_kills)
            .with("double_kills", self.double_kills)
            .with("triple_kills", self.triple_kills)
            .with("quadra_kills", self.quadra_kills)
            .with("penta_kills", self.penta_kills)
            .with("largest_multi_kill", self.largest_multi_kill)
            .with("kill_participation", self.kill_participation)
            .with("deaths", self.deaths)
            .with("assists", self.assists)
    }
}

/// Builds the row for `puuid` in `doc`, or `None` when that player is not
/// among the participants. Item names and icons are resolved through
/// `assets` using the match's major.minor version.
pub fn extract_player_row<T: HttpTransport>(
    doc: &MatchDocument,
    puuid: &str,
    assets: &mut AssetCache<T>,
) -> Option<PlayerMatchRow> {
    let p = doc.participant(puuid)?;
    let info = &doc.info;
    let version = doc.catalog_version();
    let items = resolve_items(&p, &version, assets);

    Some(PlayerMatchRow {
        match_id: doc.metadata.match_id.clone(),
        end_of_game_result: info.end_of_game_result.clone(),
        game_mode: info.game_mode.clone(),
        game_name: info.game_name.clone(),
        game_start_utc: info.game_start_timestamp.and_then(format_epoch_millis),
        duration_sec: info.game_duration,
        game_version: info.game_version.clone(),
        win: p.bool("win"),
        game_ended_in_early_surrender: p.bool("gameEndedInEarlySurrender"),
        champion_name: p.string("championName"),
        lane: p.string("lane"),
        champ_level: p.int("champLevel"),
        gold_earned: p.int("goldEarned"),
        items_purchased: p.int("itemsPurchased"),
        items,
        vision_score: p.int("visionScore"),
        damage_dealt: p.int("totalDamageDealt"),
        damage_dealt_to_champions: p.int("totalDamageDealtToChampions"),
        damage_dealt_to_buildings: p.int("damageDealtToBuildings"),
        damage_dealt_to_objectives: p.int("damageDealtToObjectives"),
        damage_dealt_to_turrets: p.int("damageDealtToTurrets"),
        damage_taken: p.int("totalDamageTaken"),
        minions_killed: p.int("totalMinionsKilled"),
        baron_kills: p.int("baronKills"),
        dragon_kills: p.int("dragonKills"),
        first_blood_kill: p.bool("firstBloodKill"),
        first_blood_assist: p.bool("firstBloodAssist"),
        first_tower_kill: p.bool("firstTowerKill"),
        kills: p.int("kills"),
        solo_kills: p.challenge_int("soloKills"),
        double_kills: p.int("doubleKills"),
        triple_kills: p.int("tripleKills"),
        quadra_kills: p.int("quadraKills"),
        penta_kills: p.int("pentaKills"),
        largest_multi_kill: p.int("largestMultiKill"),
        kill_participation: p.challenge_float("killParticipation"),
        deaths: p.int("deaths"),
        assists: p.int("assists"),
    })
}

fn resolve_items<T: HttpTransport>(
    p: &Participant<'_>,
    version: &str,
    assets: &mut AssetCache<T>,
) -> Vec<ResolvedItem> {
    let slots: Vec<String> = (0..ITEM_SLOTS).filter_map(|slot| p.item_slot(slot)).collect();
    if slots.is_empty() {
        return Vec::new();
    }

    let catalog = assets.catalog(version);
    slots
        .into_iter()
        .map(|id| match catalog.get(&id) {
            Some(meta) => ResolvedItem {
                icon_path: assets.icon(&id, meta, version),
                name: meta.name.clone(),
                id,
            },
            None => ResolvedItem {
                id,
                ..ResolvedItem::default()
            },
        })
        .collect()
}

fn format_epoch_millis(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn join_non_empty<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.filter(|s| !s.is_empty()).collect::<Vec<_>>().join(";")
}
